/// Known style keywords, matched as literal substrings in declaration order.
///
/// Order matters: the first entry found in a message wins, so
/// "轻奢日漫风格" must stay ahead of "轻奢风格" and "3D卡通风格" ahead of
/// "3D风格".
pub const STYLES: &[&str] = &[
    "人像摄影风格",
    "真实全景风格",
    "全息风格",
    "卡通插画风格",
    "城市风格",
    "像素风格",
    "赛博朋克风格",
    "蒸汽朋克风格",
    "浪漫风格",
    "3D卡通风格",
    "轻奢日漫风格",
    "轻手绘漫画风格",
    "3D风格",
    "彩色水墨风格",
    "工作室摄影风格",
    "水彩风格",
    "古典风格",
    "剪纸风格",
    "毛边风格",
    "徐悲鸿风格",
    "轻奢风格",
    "水墨画风格",
    "韩式风格",
    "现代风格",
    "复古风格",
    "彩铅风格",
    "油画风格",
    "宫崎骏风格",
    "凡高风格",
];

const STYLES_PER_LINE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    pub version: &'static str,
    /// Text-message handler priority slot requested from the host.
    pub priority: u8,
}

pub const PLUGIN_INFO: PluginInfo = PluginInfo {
    name: "YuanbaoPlugin",
    description: "元宝AI绘画插件：使用'元宝+内容+风格'或'元宝画+内容+风格'生成AI绘画",
    author: "AI Assistant",
    version: "1.0.0",
    priority: 50,
};

pub fn help_text() -> String {
    let mut text = String::from("🎨 元宝AI绘画插件使用说明\n\n");
    text.push_str("使用方法：\n");
    text.push_str("1. 元宝画+内容：例如「元宝画一只猫」\n");
    text.push_str("2. 元宝画+内容+风格：例如「元宝画美女人像摄影风格」\n\n");
    text.push_str("支持的风格：\n");
    for chunk in STYLES.chunks(STYLES_PER_LINE) {
        text.push_str(&chunk.join("、"));
        text.push('\n');
    }
    text
}
