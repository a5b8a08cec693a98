//! Render pipeline
//!
//! [`compose`] turns editor state into an ordered list of draw commands.
//! Layers, back to front:
//! 1. background clear
//! 2. spectrogram image
//! 3. pitch-row bands and octave lines
//! 4. notes
//! 5. selection box
//! 6. playhead
//!
//! A [`Canvas`] implementation replays the commands onto a real surface.

use std::collections::BTreeSet;
use std::sync::Arc;

use pr_core::{CoordinateParams, Note, NoteId, Rect, is_black_key};
use pr_spectrogram::{ColorMap, FrameMatrix, SpectrogramImage, render_image};

use crate::hit::is_displayed;
use crate::options::{Color, Theme};

// ═══════════════════════════════════════════════════════════════════════════════
// DRAW COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface
    Clear(Color),
    /// Spectrogram bitmap, drawn at the origin
    Image(Arc<SpectrogramImage>),
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, color: Color },
    Line {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        color: Color,
    },
    Note {
        id: NoteId,
        rect: Rect,
        fill: Color,
        /// Outline color when selected
        outline: Option<Color>,
        hovered: bool,
        active: bool,
    },
}

/// Drawing surface
pub trait Canvas {
    fn clear(&mut self, color: Color);
    fn draw_image(&mut self, image: &SpectrogramImage);
    fn fill_rect(&mut self, rect: &Rect, color: Color);
    fn stroke_rect(&mut self, rect: &Rect, color: Color);
    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color);
}

/// Composed frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RenderFrame {
    /// Draw every command in order
    pub fn replay(&self, canvas: &mut dyn Canvas) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(*color),
                DrawCommand::Image(image) => canvas.draw_image(image),
                DrawCommand::FillRect { rect, color } => canvas.fill_rect(rect, *color),
                DrawCommand::StrokeRect { rect, color } => canvas.stroke_rect(rect, *color),
                DrawCommand::Line {
                    x0,
                    y0,
                    x1,
                    y1,
                    color,
                } => canvas.line(*x0, *y0, *x1, *y1, *color),
                DrawCommand::Note {
                    rect,
                    fill,
                    outline,
                    ..
                } => {
                    canvas.fill_rect(rect, *fill);
                    if let Some(outline) = outline {
                        canvas.stroke_rect(rect, *outline);
                    }
                }
            }
        }
    }

    /// Note commands, in draw order
    pub fn notes(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Note { .. }))
    }
}

/// Parse `#rrggbb` or `#rrggbbaa`
pub fn parse_hex_color(text: &str) -> Option<Color> {
    let hex = text.trim().strip_prefix('#')?;
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some([channel(0)?, channel(2)?, channel(4)?, 255]),
        8 => Some([channel(0)?, channel(2)?, channel(4)?, channel(6)?]),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPECTROGRAM CACHE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    generation: u64,
    width: usize,
    height: usize,
    min_pitch: u8,
    max_pitch: u8,
    /// Folded rows, empty when unfolded
    rows: Vec<u8>,
    color_map: ColorMap,
}

/// Last rendered spectrogram image
#[derive(Debug, Clone, Default)]
pub struct SpectrogramCache {
    key: Option<CacheKey>,
    image: Option<Arc<SpectrogramImage>>,
    renders: u64,
}

impl SpectrogramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached image for this view, re-rendered only when the matrix
    /// generation or the view changed
    pub fn get(
        &mut self,
        matrix: &FrameMatrix,
        generation: u64,
        params: &CoordinateParams,
        color_map: ColorMap,
        background: Color,
    ) -> Arc<SpectrogramImage> {
        let key = CacheKey {
            generation,
            width: params.width.max(0.0).round() as usize,
            height: params.height.max(0.0).round() as usize,
            min_pitch: params.min_pitch,
            max_pitch: params.max_pitch,
            rows: if params.is_folded {
                params.used_pitches.clone()
            } else {
                Vec::new()
            },
            color_map,
        };

        if let (Some(cached), Some(image)) = (&self.key, &self.image) {
            if *cached == key {
                return Arc::clone(image);
            }
        }

        let image = Arc::new(render_image(matrix, params, color_map, background));
        self.renders += 1;
        self.key = Some(key);
        self.image = Some(Arc::clone(&image));
        image
    }

    /// Number of times an image was actually rendered
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.image = None;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPOSE
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything a frame is built from
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub params: &'a CoordinateParams,
    pub notes: &'a [Note],
    pub selection: &'a BTreeSet<NoteId>,
    pub hovered: Option<NoteId>,
    pub active: &'a BTreeSet<NoteId>,
    pub selection_box: Option<Rect>,
    pub playhead: Option<f64>,
    pub spectrogram: Option<&'a Arc<SpectrogramImage>>,
    pub theme: &'a Theme,
}

/// Build the draw list for one frame
pub fn compose(input: &RenderInput<'_>) -> RenderFrame {
    let params = input.params;
    let theme = input.theme;
    let mut commands = Vec::with_capacity(input.notes.len() + params.row_count() + 4);

    commands.push(DrawCommand::Clear(theme.background));

    if let Some(image) = input.spectrogram {
        commands.push(DrawCommand::Image(Arc::clone(image)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rows
    // ─────────────────────────────────────────────────────────────────────────
    let row_height = params.row_height();
    for &pitch in params.display_pitches().iter() {
        let y = params.pitch_to_px(pitch);
        if is_black_key(pitch) {
            commands.push(DrawCommand::FillRect {
                rect: Rect::new(0.0, y, params.width, row_height),
                color: theme.black_key_row,
            });
        }
        if pitch % 12 == 0 {
            let bottom = y + row_height;
            commands.push(DrawCommand::Line {
                x0: 0.0,
                y0: bottom,
                x1: params.width,
                y1: bottom,
                color: theme.octave_line,
            });
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notes
    // ─────────────────────────────────────────────────────────────────────────
    for note in input.notes {
        if !is_displayed(params, note.pitch()) {
            continue;
        }
        let id = note.id();
        let hovered = input.hovered == Some(id);
        let active = input.active.contains(&id);
        let fill = if active {
            theme.note_active
        } else if hovered {
            theme.note_hovered
        } else {
            note.color
                .as_deref()
                .and_then(parse_hex_color)
                .unwrap_or(theme.note)
        };
        commands.push(DrawCommand::Note {
            id,
            rect: params.note_rect(note),
            fill,
            outline: input.selection.contains(&id).then_some(theme.note_selected),
            hovered,
            active,
        });
    }

    if let Some(rect) = input.selection_box {
        commands.push(DrawCommand::FillRect {
            rect,
            color: theme.selection_fill,
        });
        commands.push(DrawCommand::StrokeRect {
            rect,
            color: theme.selection_stroke,
        });
    }

    if let Some(time) = input.playhead {
        let x = params.time_to_px(time);
        commands.push(DrawCommand::Line {
            x0: x,
            y0: 0.0,
            x1: x,
            y1: params.height,
            color: theme.playhead,
        });
    }

    RenderFrame {
        width: params.width,
        height: params.height,
        commands,
    }
}
