//! OCR engine boundary
//!
//! Engines return the raw word table (tesseract's `image_to_data` layout).
//! The bundled backend shells out to the `tesseract` binary and parses its
//! TSV output.

use anyhow::{bail, Context};
use image::{ImageFormat, RgbaImage};
use serde::Deserialize;
use std::io::{Cursor, Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info, warn};

/// One row of an OCR word table.
///
/// Rows without text describe the page/block/paragraph/line grouping rather
/// than a recognized word.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OcrRow {
    /// Hierarchy level (1 = page ... 5 = word)
    #[serde(default)]
    pub level: u32,
    pub page_num: u32,
    pub block_num: u32,
    pub par_num: u32,
    pub line_num: u32,
    pub word_num: u32,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    /// Recognition confidence in the engine's own scale (-1 for structural rows)
    pub conf: f64,
    /// Recognized text, `None` for structural rows
    pub text: Option<String>,
}

impl OcrRow {
    /// Convenience constructor for a recognized word
    #[allow(clippy::too_many_arguments)]
    pub fn word(
        page_num: u32,
        block_num: u32,
        par_num: u32,
        line_num: u32,
        word_num: u32,
        bounds: (i32, i32, i32, i32),
        conf: f64,
        text: &str,
    ) -> Self {
        Self {
            level: 5,
            page_num,
            block_num,
            par_num,
            line_num,
            word_num,
            left: bounds.0,
            top: bounds.1,
            width: bounds.2,
            height: bounds.3,
            conf,
            text: Some(text.to_string()),
        }
    }

    /// Whether the row carries recognized text
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|text| !text.is_empty())
    }
}

/// Scale an engine reports confidence in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceScale {
    /// 0 - 100 (tesseract)
    #[default]
    Percent,
    /// 0.0 - 1.0
    Fraction,
}

impl ConfidenceScale {
    /// Convert a raw engine confidence into a 0.0 - 1.0 fraction.
    ///
    /// Out-of-range values pass through unchanged.
    pub fn normalize(&self, raw: f64) -> f64 {
        match self {
            ConfidenceScale::Percent => raw / 100.0,
            ConfidenceScale::Fraction => raw,
        }
    }
}

/// Something that can turn an image into an OCR word table
pub trait OcrEngine: Send + Sync {
    /// Run OCR once over the whole image
    fn image_to_data(&self, image: &RgbaImage, language: Option<&str>) -> anyhow::Result<Vec<OcrRow>>;

    /// Scale of the `conf` column
    fn confidence_scale(&self) -> ConfidenceScale {
        ConfidenceScale::Percent
    }
}

/// OCR backend driving the `tesseract` command line tool
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: String,
    extra_args: Vec<String>,
}

impl TesseractEngine {
    /// Use `tesseract` from `PATH`
    pub fn new() -> Self {
        Self::with_command("tesseract")
    }

    /// Use a specific tesseract executable
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            extra_args: Vec::new(),
        }
    }

    /// Extra arguments placed before the `tsv` config (e.g. `--psm 6`)
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Executable this engine runs
    pub fn command(&self) -> &str {
        &self.command
    }

    fn build_command(&self, language: Option<&str>) -> Command {
        let mut command = Command::new(&self.command);
        command.arg("stdin").arg("stdout");
        if let Some(language) = language {
            command.arg("-l").arg(language);
        }
        command
            .args(&self.extra_args)
            .arg("tsv")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractEngine {
    fn image_to_data(&self, image: &RgbaImage, language: Option<&str>) -> anyhow::Result<Vec<OcrRow>> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .context("Failed to encode image for tesseract")?;

        debug!(
            "Running {} on {}x{} image (language: {:?})",
            self.command,
            image.width(),
            image.height(),
            language
        );

        let mut child = self
            .build_command(language)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.command))?;

        let mut stdin = child.stdin.take().context("tesseract stdin unavailable")?;
        let writer = thread::spawn(move || stdin.write_all(&png));

        let output = child
            .wait_with_output()
            .context("Failed to wait for tesseract")?;
        let written = writer
            .join()
            .map_err(|_| anyhow::anyhow!("tesseract stdin writer panicked"))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            bail!("{} exited with {}: {}", self.command, output.status, stderr.trim());
        }
        written.context("Failed to write image to tesseract")?;
        if !stderr.trim().is_empty() {
            warn!("tesseract: {}", stderr.trim());
        }

        let rows = parse_tsv(output.stdout.as_slice())?;
        info!("tesseract returned {} rows", rows.len());
        Ok(rows)
    }
}

/// Parse tesseract's TSV output
pub fn parse_tsv<R: Read>(reader: R) -> anyhow::Result<Vec<OcrRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<OcrRow>().enumerate() {
        let row = record.with_context(|| format!("Malformed tesseract TSV row {}", line + 2))?;
        rows.push(row);
    }
    Ok(rows)
}
