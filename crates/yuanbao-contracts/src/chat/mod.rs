mod style_registry;
mod trigger_parser;

pub use style_registry::{help_text, PluginInfo, PLUGIN_INFO, STYLES};
pub use trigger_parser::{match_message, parse_draw_request, DrawRequest};
