use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use memmap2::Mmap;
use ttf_parser::Face;

use crate::error::Error;

/// Families tried in order when no font is configured explicitly.
const PREFERRED_FAMILIES: &[&str] = &[
    "liberation sans",
    "dejavu sans",
    "arial",
    "helvetica",
    "noto sans",
    "roboto",
    "open sans",
];

/// (lowercase family name, bold) -> (file path, face index within TTC).
/// Italic faces are never indexed.
type FontLookup = HashMap<(String, bool), (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

/// An owned font file and the face to use inside it.
#[derive(Clone)]
pub struct FontFace {
    data: Vec<u8>,
    index: u32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontFace {
    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<FontFace, Error> {
        Face::parse(&data, index).map_err(|e| Error::Font(format!("unparseable font: {e}")))?;
        Ok(FontFace { data, index })
    }

    pub fn from_path(path: &Path) -> Result<FontFace, Error> {
        let data = std::fs::read(path)?;
        FontFace::from_bytes(data, 0)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))
    }

    /// Parsing only reads the table directory, so faces are parsed on use.
    pub(crate) fn face(&self) -> Result<Face<'_>, Error> {
        Face::parse(&self.data, self.index).map_err(|e| Error::Font(e.to_string()))
    }
}

/// The regular and bold faces every block is drawn with.
#[derive(Clone, Debug)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: FontFace,
}

impl FontSet {
    /// Looks for a sans-serif family in the system font directories (and
    /// `CVPRESS_FONTS`). Bold falls back to the regular face.
    pub fn discover() -> Result<FontSet, Error> {
        let index = get_font_index();
        let family = PREFERRED_FAMILIES
            .iter()
            .map(|f| f.to_string())
            .find(|f| index.contains_key(&(f.clone(), false)))
            .or_else(|| {
                let mut families: Vec<&String> = index
                    .keys()
                    .filter(|(_, bold)| !bold)
                    .map(|(family, _)| family)
                    .collect();
                families.sort();
                families.first().map(|f| f.to_string())
            })
            .ok_or_else(|| {
                Error::Font("no usable font found; set CVPRESS_FONTS to a font directory".into())
            })?;

        let regular = load_indexed(index, &family, false)?;
        let bold = match load_indexed(index, &family, true) {
            Ok(face) => face,
            Err(_) => {
                log::warn!("No bold face for {family}, using regular");
                regular.clone()
            }
        };
        log::info!("Using font family: {family}");
        Ok(FontSet { regular, bold })
    }

    pub fn from_paths(regular: &Path, bold: Option<&Path>) -> Result<FontSet, Error> {
        let regular = FontFace::from_path(regular)?;
        let bold = match bold {
            Some(path) => FontFace::from_path(path)?,
            None => regular.clone(),
        };
        Ok(FontSet { regular, bold })
    }

    pub fn get(&self, bold: bool) -> &FontFace {
        if bold { &self.bold } else { &self.regular }
    }
}

fn load_indexed(index: &FontLookup, family: &str, bold: bool) -> Result<FontFace, Error> {
    let (path, face_index) = index
        .get(&(family.to_string(), bold))
        .ok_or_else(|| Error::Font(format!("{family} bold={bold} not installed")))?;
    let data = std::fs::read(path)?;
    FontFace::from_bytes(data, *face_index)
}

fn font_family_name(face: &Face) -> Option<String> {
    // ID 1 (Family) keeps "Noto Sans" apart from "Noto Sans Display".
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

fn read_font_style(data: &[u8], face_index: u32) -> Option<(String, bool, bool)> {
    let face = Face::parse(data, face_index).ok()?;
    let family = font_family_name(&face)?;
    Some((family, face.is_bold(), face.is_italic()))
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(val) = std::env::var("CVPRESS_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        dirs.extend(
            val.split(sep)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        );
    }

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn is_font_collection(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttc"))
}

fn scan_font_dirs() -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut files_scanned = 0u32;
    let mut visited = std::collections::HashSet::new();

    // CVPRESS_FONTS entries come first and win over system fonts of the same family
    let mut stack: Vec<PathBuf> = font_directories();
    stack.reverse();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };

        let mut font_files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_font_file(&path) {
                font_files.push(path);
            }
        }
        font_files.sort();

        for file_path in font_files {
            files_scanned += 1;
            let Ok(file) = std::fs::File::open(&file_path) else {
                continue;
            };
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            let face_count = if is_font_collection(&file_path) {
                ttf_parser::fonts_in_collection(&data).unwrap_or(1)
            } else {
                1
            };
            for face_idx in 0..face_count {
                if let Some((family, bold, italic)) = read_font_style(&data, face_idx)
                    && !italic
                {
                    index
                        .entry((family.to_lowercase(), bold))
                        .or_insert((file_path.clone(), face_idx));
                }
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} files parsed → {} entries",
        t0.elapsed().as_secs_f64() * 1000.0,
        files_scanned,
        index.len(),
    );

    index
}

fn get_font_index() -> &'static FontLookup {
    FONT_INDEX.get_or_init(scan_font_dirs)
}
