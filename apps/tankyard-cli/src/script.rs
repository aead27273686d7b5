use anyhow::{Context, bail};
use tankyard_input::{InputSnapshot, Key, MouseButton};

/// One segment of a drive script: what is held, and for how many frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub keys: Vec<Key>,
    /// Vertical mouse motion per frame with the right button held.
    pub drag: Option<f32>,
    pub frames: u64,
}

impl Segment {
    pub fn apply(&self, input: &mut InputSnapshot) {
        input.clear();
        for key in &self.keys {
            input.set_key(*key, true);
        }
        if let Some(dy) = self.drag {
            input.set_button(MouseButton::Right, true);
            input.add_motion(0.0, dy);
        }
        input.capture();
    }
}

/// Parse `w:60,a+w:30,drag=-5:20,idle:10`.
///
/// Each comma-separated segment is `<held>:<frames>` where `<held>` is
/// `idle`, `drag=<dy>`, or key names joined by `+`.
pub fn parse(text: &str) -> anyhow::Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for raw in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (held, frames) = raw
            .rsplit_once(':')
            .with_context(|| format!("segment `{raw}` has no `:frames`"))?;
        let frames: u64 = frames
            .parse()
            .with_context(|| format!("bad frame count in `{raw}`"))?;

        let mut keys = Vec::new();
        let mut drag = None;
        for name in held.split('+').map(str::trim) {
            if name.eq_ignore_ascii_case("idle") {
                continue;
            }
            if let Some(dy) = name.strip_prefix("drag=") {
                drag = Some(dy.parse().with_context(|| format!("bad drag in `{raw}`"))?);
                continue;
            }
            keys.push(key_by_name(name)?);
        }
        segments.push(Segment { keys, drag, frames });
    }
    if segments.is_empty() {
        bail!("empty drive script");
    }
    Ok(segments)
}

fn key_by_name(name: &str) -> anyhow::Result<Key> {
    let key = match name.to_ascii_lowercase().as_str() {
        "w" => Key::W,
        "a" => Key::A,
        "s" => Key::S,
        "d" => Key::D,
        "e" => Key::E,
        "o" => Key::O,
        "comma" => Key::Comma,
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "esc" | "escape" => Key::Escape,
        other => bail!("unknown key `{other}`"),
    };
    Ok(key)
}
