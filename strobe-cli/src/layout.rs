//! Generate an HTML visualization of every layer of a keymap.
//!
//! Each layer is drawn as the 8 x 16 sensing matrix. Positions with a key
//! show its id and binding; cells are coloured by the domain the payload
//! dispatches to.

use strobe_core::payload::{AnalogTarget, Domain};
use strobe_core::{keycode, Binding, ConfigStore, Route, Setting, COLS, MAX_LAYERS, ROWS};

/// Cell edge in SVG pixels.
const U: f64 = 48.0;
/// Cell pitch.
const S: f64 = U + 6.0;
/// Cell corner radius.
const R: f64 = 3.0;
/// Blank border around the drawing.
const MARGIN: f64 = 16.0;
/// Vertical space reserved for each layer title.
const TITLE: f64 = 40.0;

/// Short label for a binding, e.g. `A`, `Ly2`, `~M3` (analog mouse axis 3).
pub fn binding_label(binding: Binding) -> String {
    if !binding.is_bound() {
        return String::new();
    }
    let payload = binding.payload;
    let base = match binding.route {
        Route::Analog => {
            return match AnalogTarget::classify(payload) {
                Some(AnalogTarget::Mouse(i)) => format!("~M{i}"),
                Some(AnalogTarget::Joystick(i)) => format!("~J{i}"),
                None => format!("~{payload:02X}"),
            }
        }
        Route::Special => return format!("*{payload:02X}"),
        Route::Momentary | Route::Toggle => match Domain::classify(payload) {
            Domain::Keyboard(code) => keycode::key_name(code)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{code:02X}")),
            Domain::MouseButton(i) => format!("M{i}"),
            Domain::Joystick(i) => format!("J{i}"),
            Domain::Layer(i) => format!("Ly{i}"),
            Domain::Lock => "Lock".to_string(),
            Domain::Unassigned => format!("?{payload:02X}"),
        },
    };
    if binding.route == Route::Toggle {
        format!("^{base}")
    } else {
        base
    }
}

fn key_class(binding: Binding) -> &'static str {
    if !binding.is_bound() {
        return "key unbound";
    }
    match binding.route {
        Route::Analog => "key analog",
        Route::Special => "key special",
        Route::Momentary | Route::Toggle => match Domain::classify(binding.payload) {
            Domain::Keyboard(_) => "key",
            Domain::MouseButton(_) | Domain::Joystick(_) => "key pointer",
            Domain::Layer(_) | Domain::Lock => "key layer",
            Domain::Unassigned => "key unassigned",
        },
    }
}

/// One layer of the matrix as an SVG group.
fn render_layer<C: ConfigStore>(config: &C, layer: usize, y_offset: f64) -> String {
    let mut svg = format!(r#"<g transform="translate({MARGIN}, {y_offset})">"#);

    svg.push_str(&format!(
        r#"<text x="0" y="-10" class="layer-title">Layer {layer}{}</text>"#,
        if layer == 0 { " (Base)" } else { "" }
    ));

    for row in 0..ROWS {
        for col in 0..COLS {
            let x = col as f64 * S;
            let y = row as f64 * S;

            if !config.is_position_active(row, col) {
                svg.push_str(&format!(
                    r#"<rect x="{x}" y="{y}" width="{U}" height="{U}" rx="{R}" class="key empty"/>"#
                ));
                continue;
            }

            let id = usize::from(config.user_id(row, col));
            let binding = config.binding(id, layer);
            svg.push_str(&format!(
                r#"<rect x="{x}" y="{y}" width="{U}" height="{U}" rx="{R}" class="{}"/>"#,
                key_class(binding)
            ));
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" class="id">{id}</text>"#,
                x + 4.0,
                y + 12.0,
            ));

            let label = binding_label(binding);
            if !label.is_empty() {
                let font_class = if label.len() > 4 { " small" } else { "" };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" class="label{font_class}">{}</text>"#,
                    x + U / 2.0,
                    y + U / 2.0 + 4.0,
                    html_escape(&label),
                ));
            }
        }
    }

    svg.push_str("</g>");
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Standalone HTML page with one matrix drawing per configured layer.
pub fn generate_html<C: ConfigStore>(config: &C) -> String {
    let layers = usize::from(config.setting(Setting::LayerCount)).clamp(1, MAX_LAYERS);
    let layer_height = ROWS as f64 * S + TITLE;
    let total_width = COLS as f64 * S + 2.0 * MARGIN;
    let total_height = layers as f64 * layer_height + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Strobe Keymap</title>
<style>
  body {{ background: #101418; color: #dde; font-family: sans-serif; margin: 1.5em; }}
  .key {{ fill: #16213e; stroke: #0f3460; stroke-width: 1.5; }}
  .key.empty {{ fill: #0d1117; stroke: #21262d; stroke-dasharray: 3 3; }}
  .key.unbound {{ fill: #1a1a2e; stroke: #30365e; stroke-dasharray: 2 2; }}
  .key.layer {{ fill: #2d1b4e; stroke: #e94560; stroke-width: 2; }}
  .key.pointer {{ fill: #1b2e4e; stroke: #53a8b6; }}
  .key.analog {{ fill: #1b3e2e; stroke: #5fb653; }}
  .key.special, .key.unassigned {{ fill: #3e2e1b; stroke: #b6a853; }}
  .id {{ fill: #778; font-size: 9px; pointer-events: none; }}
  .label {{ fill: #dde; font-family: monospace; font-size: 12px; text-anchor: middle; }}
  .label.small {{ font-size: 10px; }}
  .layer-title {{ fill: #e94560; font-size: 16px; font-weight: bold; }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    for layer in 0..layers {
        let y_offset = MARGIN + layer as f64 * layer_height + TITLE - 10.0;
        html.push_str(&render_layer(config, layer, y_offset));
        html.push('\n');
    }

    html.push_str("</svg>\n</body>\n</html>\n");
    html
}
