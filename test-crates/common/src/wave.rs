use render_wasmer_common::Color;
use render_wasmer_common::StatusCode;
use render_wasmer_guest::ParameterStore;
use render_wasmer_guest::Renderer;
use serde::Deserialize;
use serde_json::error::Category;
use std::fmt::Write;

/// characters a wave string may contain
pub const WAVE_CHARS: &str = "01xzpnPNhlHL.=|23456789ud";

#[derive(Debug, Deserialize)]
struct Figure {
    signal: Vec<Signal>,
}

#[derive(Debug, Deserialize)]
struct Signal {
    #[serde(default)]
    name: String,
    wave: String,
}

/// A tiny timing diagram renderer, just enough to exercise every status a real figure
/// generator reports.
///
/// - broken json is `MalformedInput`
/// - json without a `signal` list of `{name, wave}` objects is `InvalidValue`
/// - unknown wave characters are `AssemblyFailure`
/// - an empty signal list is `RenderFailure`
#[derive(Clone, Copy, Debug, Default)]
pub struct WaveRenderer;

impl WaveRenderer {
    fn parse(input: &str) -> Result<Figure, StatusCode> {
        serde_json::from_str(input).map_err(|e| match e.classify() {
            Category::Syntax | Category::Eof => StatusCode::MalformedInput,
            Category::Data => StatusCode::InvalidValue,
            Category::Io => StatusCode::Unknown,
        })
    }

    fn color(parameters: &ParameterStore, key: &str) -> String {
        Color::unpack(parameters.value(key).unwrap_or_default()).to_hex()
    }

    /// `count * unit`, a figure too large for u32 coordinates cannot be drawn.
    fn span(count: usize, unit: u32) -> Result<u32, StatusCode> {
        u32::try_from(count)
            .ok()
            .and_then(|count| count.checked_mul(unit))
            .ok_or_else(|| {
                tracing::debug!(count, unit, "figure geometry overflows");
                StatusCode::RenderFailure
            })
    }
}

fn drawn(result: std::fmt::Result) -> Result<(), StatusCode> {
    result.map_err(|_| StatusCode::RenderFailure)
}

impl Renderer for WaveRenderer {
    fn render(&self, input: &str, parameters: &ParameterStore) -> Result<String, StatusCode> {
        let figure = Self::parse(input)?;
        if let Some(bad) = figure
            .signal
            .iter()
            .flat_map(|signal| signal.wave.chars())
            .find(|c| !WAVE_CHARS.contains(*c))
        {
            tracing::debug!(%bad, "unknown wave character");
            return Err(StatusCode::AssemblyFailure);
        }
        if figure.signal.is_empty() {
            return Err(StatusCode::RenderFailure);
        }

        let height = parameters.value("signal-height").unwrap_or(24);
        let cycle = parameters.value("cycle-width").unwrap_or(48);
        let cycles = figure
            .signal
            .iter()
            .map(|signal| signal.wave.chars().count())
            .max()
            .unwrap_or_default();
        // every coordinate below stays within these two
        let width = Self::span(cycles, cycle)?;
        let total_height = Self::span(figure.signal.len(), height)?;

        let mut svg = String::new();
        drawn(write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            width, total_height
        ))?;
        if let Some(background) = parameters
            .value("background")
            .and_then(Color::unpack_optional)
        {
            drawn(write!(
                svg,
                r#"<rect width="100%" height="100%" fill="{}"/>"#,
                background
            ))?;
        }
        let path_color = Self::color(parameters, "signal-path-color");
        for (row, signal) in figure.signal.iter().enumerate() {
            let top = Self::span(row, height)?;
            let bottom = top.checked_add(height).ok_or(StatusCode::RenderFailure)?;
            drawn(write!(
                svg,
                r#"<text y="{}">{}</text><path stroke="{}" d=""#,
                bottom, signal.name, path_color
            ))?;
            for (i, c) in signal.wave.chars().enumerate() {
                let x = Self::span(i, cycle)?;
                let y = match c {
                    '1' | 'h' | 'H' | 'p' | 'P' => top,
                    _ => bottom,
                };
                drawn(write!(svg, "M{} {}h{}", x, y, cycle))?;
            }
            svg.push_str(r#""/>"#);
        }
        svg.push_str("</svg>");
        Ok(svg)
    }
}
