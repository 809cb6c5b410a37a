//! `meta.txt`: the text manifest read by the display firmware.
//!
//! The grammar is fixed, blank lines included:
//!
//! ```text
//! Filetype: Flipper Animation
//! Version: 1
//!
//! Width: 128
//! Height: 64
//! Passive frames: <N>
//! Active frames: 0
//! Frames order: <0 1 .. N-1>
//! Active cycles: 0
//! Frame rate: 6
//! Duration: 28800
//! Active cooldown: 0
//!
//! Bubble slots: 0
//! ```

use crate::foundation::{
    core::{DURATION, FRAME_RATE, TARGET_HEIGHT, TARGET_WIDTH},
    error::{FlipError, FlipResult},
};

pub const MANIFEST_FILE_NAME: &str = "meta.txt";

const FILETYPE: &str = "Flipper Animation";
const VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    pub passive_frames: u32,
    pub frames_order: Vec<u32>,
}

impl Manifest {
    /// Manifest for `n` passive frames played in file order.
    pub fn for_frames(n: u32) -> Self {
        Self {
            passive_frames: n,
            frames_order: (0..n).collect(),
        }
    }

    pub fn render(&self) -> String {
        let order = self
            .frames_order
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "Filetype: {FILETYPE}\n\
             Version: {VERSION}\n\
             \n\
             Width: {TARGET_WIDTH}\n\
             Height: {TARGET_HEIGHT}\n\
             Passive frames: {}\n\
             Active frames: 0\n\
             Frames order: {order}\n\
             Active cycles: 0\n\
             Frame rate: {FRAME_RATE}\n\
             Duration: {DURATION}\n\
             Active cooldown: 0\n\
             \n\
             Bubble slots: 0\n",
            self.passive_frames
        )
    }

    /// Strict parse of [`Manifest::render`] output. Every fixed field must carry its constant.
    pub fn parse(text: &str) -> FlipResult<Self> {
        let mut lines = LineCursor {
            lines: text.lines(),
            line_no: 0,
        };

        expect_field(lines.next("Filetype")?, "Filetype", FILETYPE)?;
        expect_field(lines.next("Version")?, "Version", &VERSION.to_string())?;
        expect_blank(lines.next("blank line")?)?;
        expect_field(lines.next("Width")?, "Width", &TARGET_WIDTH.to_string())?;
        expect_field(lines.next("Height")?, "Height", &TARGET_HEIGHT.to_string())?;
        let passive = field(lines.next("Passive frames")?, "Passive frames")?;
        let passive_frames: u32 = passive
            .parse()
            .map_err(|_| FlipError::manifest(format!("bad passive frame count '{passive}'")))?;
        expect_field(lines.next("Active frames")?, "Active frames", "0")?;
        let order = field(lines.next("Frames order")?, "Frames order")?;
        let frames_order = order
            .split_whitespace()
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|_| FlipError::manifest(format!("bad frame index '{s}'")))
            })
            .collect::<FlipResult<Vec<_>>>()?;
        expect_field(lines.next("Active cycles")?, "Active cycles", "0")?;
        expect_field(lines.next("Frame rate")?, "Frame rate", &FRAME_RATE.to_string())?;
        expect_field(lines.next("Duration")?, "Duration", &DURATION.to_string())?;
        expect_field(lines.next("Active cooldown")?, "Active cooldown", "0")?;
        expect_blank(lines.next("blank line")?)?;
        expect_field(lines.next("Bubble slots")?, "Bubble slots", "0")?;

        if let Some(extra) = lines.lines.find(|l| !l.trim().is_empty()) {
            return Err(FlipError::manifest(format!("unexpected trailing line '{extra}'")));
        }
        if !frames_order.iter().copied().eq(0..passive_frames) {
            return Err(FlipError::manifest(format!(
                "frame order must be 0..{passive_frames} in file order, found '{order}'"
            )));
        }

        Ok(Self {
            passive_frames,
            frames_order,
        })
    }
}

struct LineCursor<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> LineCursor<'a> {
    fn next(&mut self, what: &str) -> FlipResult<&'a str> {
        self.line_no += 1;
        let line_no = self.line_no;
        self.lines
            .next()
            .ok_or_else(|| FlipError::manifest(format!("line {line_no}: missing {what}")))
    }
}

fn field<'a>(line: &'a str, key: &str) -> FlipResult<&'a str> {
    line.strip_prefix(key)
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::trim)
        .ok_or_else(|| FlipError::manifest(format!("expected '{key}:', found '{line}'")))
}

fn expect_field(line: &str, key: &str, want: &str) -> FlipResult<()> {
    let got = field(line, key)?;
    if got != want {
        return Err(FlipError::manifest(format!(
            "'{key}' must be '{want}', found '{got}'"
        )));
    }
    Ok(())
}

fn expect_blank(line: &str) -> FlipResult<()> {
    if !line.trim().is_empty() {
        return Err(FlipError::manifest(format!(
            "expected blank line, found '{line}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_matches_fixed_grammar() {
        let expected = "Filetype: Flipper Animation\n\
                        Version: 1\n\
                        \n\
                        Width: 128\n\
                        Height: 64\n\
                        Passive frames: 4\n\
                        Active frames: 0\n\
                        Frames order: 0 1 2 3\n\
                        Active cycles: 0\n\
                        Frame rate: 6\n\
                        Duration: 28800\n\
                        Active cooldown: 0\n\
                        \n\
                        Bubble slots: 0\n";
        assert_eq!(Manifest::for_frames(4).render(), expected);
    }

    #[test]
    fn empty_sequence_has_empty_order_line() {
        let text = Manifest::for_frames(0).render();
        assert!(text.contains("Passive frames: 0\n"));
        assert!(text.contains("\nFrames order: \n"));
        assert_eq!(Manifest::parse(&text).unwrap(), Manifest::for_frames(0));
    }

    #[test]
    fn parse_accepts_rendered_output() {
        let m = Manifest::for_frames(12);
        assert_eq!(Manifest::parse(&m.render()).unwrap(), m);
    }

    #[test]
    fn parse_rejects_wrong_constants_and_order() {
        let bad_rate = Manifest::for_frames(2)
            .render()
            .replace("Frame rate: 6", "Frame rate: 30");
        assert!(matches!(
            Manifest::parse(&bad_rate),
            Err(FlipError::Manifest(_))
        ));

        let bad_order = Manifest::for_frames(2)
            .render()
            .replace("Frames order: 0 1", "Frames order: 0 5");
        assert!(Manifest::parse(&bad_order).is_err());

        let swapped = Manifest::for_frames(2)
            .render()
            .replace("Frames order: 0 1", "Frames order: 1 0");
        assert!(matches!(
            Manifest::parse(&swapped),
            Err(FlipError::Manifest(_))
        ));

        let short = Manifest::for_frames(3)
            .render()
            .replace("Frames order: 0 1 2", "Frames order: 0 1");
        assert!(Manifest::parse(&short).is_err());

        let truncated = "Filetype: Flipper Animation\nVersion: 1\n";
        let err = Manifest::parse(truncated).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
