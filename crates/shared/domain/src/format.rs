use std::fmt;

/// Upload formats accepted by `/process`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Png,
    Jpg,
    Jpeg,
    Pdf,
    Bmp,
    Tiff,
}

impl DocumentFormat {
    pub const ALL: [Self; 6] = [Self::Png, Self::Jpg, Self::Jpeg, Self::Pdf, Self::Bmp, Self::Tiff];

    /// Detects the format from a file name.
    ///
    /// The name must contain a dot; the extension is whatever follows the last
    /// one and is matched case-insensitively.
    #[must_use]
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Pdf => "pdf",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// PDFs go through the rasterizer before recognition.
    #[must_use]
    pub const fn is_pdf(self) -> bool {
        matches!(self, Self::Pdf)
    }

    #[must_use]
    pub fn extensions() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.extension()).collect()
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
