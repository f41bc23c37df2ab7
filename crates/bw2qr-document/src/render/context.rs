// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Imaging context — process-wide state shared by every renderer.
//
// Holds the font registry. It is created once, on the first
// `StyleRenderer::new`, and handed out as an `Arc` afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ab_glyph::FontArc;
use tracing::{debug, info, warn};

static CONTEXT: Mutex<Option<Arc<ImagingContext>>> = Mutex::new(None);

/// Directories scanned for font files, in order.
const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// Families tried when the requested one is not installed.
const FALLBACK_FAMILIES: &[&str] = &[
    "DejaVuSans-Bold",
    "LiberationSans-Bold",
    "Arial Bold",
    "DejaVuSans",
    "LiberationSans-Regular",
    "Arial",
    "Helvetica",
];

/// How deep font directories are searched.
const MAX_FONT_DIR_DEPTH: usize = 4;

/// Shared imaging resources.
pub struct ImagingContext {
    font_dirs: Vec<PathBuf>,
    /// Resolved fonts by requested family, including misses.
    fonts: Mutex<HashMap<String, Option<FontArc>>>,
}

impl std::fmt::Debug for ImagingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagingContext")
            .field("font_dirs", &self.font_dirs)
            .finish_non_exhaustive()
    }
}

impl ImagingContext {
    /// Return the process-wide context, creating it on first use.
    pub(crate) fn acquire() -> Arc<Self> {
        let mut slot = CONTEXT.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(context) = slot.as_ref() {
            return Arc::clone(context);
        }

        let mut font_dirs: Vec<PathBuf> = FONT_DIRS.iter().map(PathBuf::from).collect();
        if let Some(home) = std::env::var_os("HOME") {
            font_dirs.push(Path::new(&home).join(".fonts"));
            font_dirs.push(Path::new(&home).join(".local/share/fonts"));
        }
        font_dirs.retain(|dir| dir.is_dir());
        info!(font_dirs = font_dirs.len(), "imaging context initialised");

        let context = Arc::new(Self {
            font_dirs,
            fonts: Mutex::new(HashMap::new()),
        });
        *slot = Some(Arc::clone(&context));
        context
    }

    /// Whether the process-wide context already exists.
    pub fn is_initialised() -> bool {
        CONTEXT
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or_else(|e| e.into_inner().is_some())
    }

    /// Resolve a font by family name or file path.
    ///
    /// Falls back to common sans-serif families; `None` when nothing usable
    /// is installed.
    pub fn font(&self, family: &str) -> Option<FontArc> {
        let mut fonts = self.fonts.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = fonts.get(family) {
            return cached.clone();
        }

        let resolved = self.load(family).or_else(|| {
            warn!(family, "font not found, trying fallbacks");
            FALLBACK_FAMILIES.iter().find_map(|&fallback| self.load(fallback))
        });
        if resolved.is_none() {
            warn!(family, "no usable font installed, captions are disabled");
        }
        fonts.insert(family.to_owned(), resolved.clone());
        resolved
    }

    fn load(&self, family: &str) -> Option<FontArc> {
        let direct = Path::new(family);
        let path = if direct.is_file() {
            direct.to_path_buf()
        } else {
            let wanted = normalise(family);
            self.font_dirs
                .iter()
                .find_map(|dir| find_font_file(dir, &wanted, MAX_FONT_DIR_DEPTH))?
        };

        let bytes = std::fs::read(&path).ok()?;
        match FontArc::try_from_vec(bytes) {
            Ok(font) => {
                debug!(family, path = %path.display(), "font loaded");
                Some(font)
            }
            Err(err) => {
                debug!(family, path = %path.display(), %err, "not a usable font");
                None
            }
        }
    }
}

/// Lowercase and drop separators so "Arial-Black", "Arial Black" and
/// "ArialBlack" all compare equal.
fn normalise(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_font_file(dir: &Path, wanted: &str, depth: usize) -> Option<PathBuf> {
    let mut subdirs = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            subdirs.push(path);
            continue;
        }
        let is_font = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"));
        let stem_matches = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| normalise(stem) == wanted);
        if is_font && stem_matches {
            return Some(path);
        }
    }

    if depth == 0 {
        return None;
    }
    subdirs
        .iter()
        .find_map(|sub| find_font_file(sub, wanted, depth - 1))
}
