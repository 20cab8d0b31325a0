use anyhow::{bail, Context};
use craftbench_workbench::PointerInput;
use glam::Vec2;
use std::{fs, path::Path};

/// One line of a pointer script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerStep {
    Down(Vec2),
    Hold(Vec2),
    Up(Vec2),
    Wait(f64),
}

/// Pointer samples replayed one per frame, with `wait` lines idling the
/// pointer for whole frames.
pub struct PointerScript {
    steps: Vec<PointerStep>,
    index: usize,
    waited: f64,
    last: Vec2,
}

impl PointerScript {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading pointer script {}", path.display()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let mut steps = Vec::new();
        for (number, raw) in contents.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let step = parse_step(line).with_context(|| format!("line {}: {raw}", number + 1))?;
            steps.push(step);
        }
        if steps.is_empty() {
            bail!("pointer script contains no steps");
        }
        Ok(Self {
            steps,
            index: 0,
            waited: 0.0,
            last: Vec2::ZERO,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    /// Pointer state for the next frame of length `dt`, or `None` once every
    /// step has played.
    pub fn advance(&mut self, dt: f64) -> Option<PointerInput> {
        let step = *self.steps.get(self.index)?;
        let input = match step {
            PointerStep::Down(at) => PointerInput::down(at),
            PointerStep::Hold(at) => PointerInput::hold(at),
            PointerStep::Up(at) => PointerInput::up(at),
            PointerStep::Wait(seconds) => {
                self.waited += dt;
                if self.waited + 1e-9 >= seconds {
                    self.waited = 0.0;
                    self.index += 1;
                }
                return Some(PointerInput::idle(self.last));
            }
        };
        self.last = input.position;
        self.index += 1;
        Some(input)
    }
}

fn parse_step(line: &str) -> anyhow::Result<PointerStep> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default();
    let mut number = |what: &str| -> anyhow::Result<f64> {
        let raw = parts
            .next()
            .with_context(|| format!("`{verb}` is missing {what}"))?;
        raw.parse::<f64>()
            .with_context(|| format!("{what} `{raw}` is not a number"))
    };

    let step = match verb {
        "down" | "hold" | "up" => {
            let at = Vec2::new(number("x")? as f32, number("y")? as f32);
            match verb {
                "down" => PointerStep::Down(at),
                "hold" => PointerStep::Hold(at),
                _ => PointerStep::Up(at),
            }
        }
        "wait" => {
            let seconds = number("seconds")?;
            if seconds < 0.0 {
                bail!("wait must not be negative");
            }
            PointerStep::Wait(seconds)
        }
        other => bail!("unknown pointer step `{other}`"),
    };
    if parts.next().is_some() {
        bail!("trailing input after `{verb}`");
    }
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_verb_and_skips_comments() {
        let script = PointerScript::parse(
            "# press and drag\ndown 10 20\nhold 11.5 20\n\nwait 0.5 # pause\nup 12 21\n",
        )
        .unwrap();
        assert_eq!(
            script.steps,
            vec![
                PointerStep::Down(Vec2::new(10.0, 20.0)),
                PointerStep::Hold(Vec2::new(11.5, 20.0)),
                PointerStep::Wait(0.5),
                PointerStep::Up(Vec2::new(12.0, 21.0)),
            ]
        );
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(PointerScript::parse("").is_err());
        assert!(PointerScript::parse("tap 1 2").is_err());
        assert!(PointerScript::parse("down 1").is_err());
        assert!(PointerScript::parse("down 1 two").is_err());
        assert!(PointerScript::parse("up 1 2 3").is_err());
        assert!(PointerScript::parse("wait -1").is_err());
    }

    #[test]
    fn wait_idles_at_last_position_for_whole_frames() {
        let mut script = PointerScript::parse("down 5 6\nwait 0.1\nup 5 6").unwrap();
        let dt = 0.05;

        assert_eq!(script.advance(dt), Some(PointerInput::down(Vec2::new(5.0, 6.0))));
        assert_eq!(script.advance(dt), Some(PointerInput::idle(Vec2::new(5.0, 6.0))));
        assert_eq!(script.advance(dt), Some(PointerInput::idle(Vec2::new(5.0, 6.0))));
        assert_eq!(script.advance(dt), Some(PointerInput::up(Vec2::new(5.0, 6.0))));
        assert!(script.is_finished());
        assert_eq!(script.advance(dt), None);
    }
}
