pub mod arena;
pub mod wave;

pub use arena::ArenaGuest;
pub use wave::WaveRenderer;

use render_wasmer_common::Schema;
use render_wasmer_guest::RenderModule;

/// the timing diagram every protocol test renders
pub const CLOCK: &str = r#"{"signal":[{"name":"clk","wave":"p.."}]}"#;

/// an unterminated object
pub const MALFORMED: &str = r#"{"signal":[{"name":"clk""#;

pub fn wave_guest() -> ArenaGuest<WaveRenderer> {
    ArenaGuest::new(RenderModule::new(WaveRenderer))
}

pub fn wave_guest_with_schema(schema: &'static Schema) -> ArenaGuest<WaveRenderer> {
    ArenaGuest::new(RenderModule::with_schema(WaveRenderer, schema))
}
