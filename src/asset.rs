use crate::Error;

/// Container formats tried by default, in fallback order.
pub const DEFAULT_FORMATS: [&str; 3] = ["webm", "mp4", "ogg"];

const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "ogg", "ogv", "webm", "mov", "m4v"];

/// The media a player is mounted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetReference {
    /// A single media URL.
    Single(String),
    /// An ordered list of URLs; earlier entries are preferred.
    Fallbacks(Vec<String>),
}

impl AssetReference {
    /// The preferred URL, if there is one.
    pub fn primary(&self) -> Option<&str> {
        match self {
            AssetReference::Single(url) => Some(url.as_str()),
            AssetReference::Fallbacks(urls) => urls.first().map(String::as_str),
        }
    }

    /// All candidate URLs in preference order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        let urls: &[String] = match self {
            AssetReference::Single(url) => std::slice::from_ref(url),
            AssetReference::Fallbacks(urls) => urls,
        };
        urls.iter().map(String::as_str)
    }

    /// Parses every candidate into a URI, failing on the first malformed one.
    pub fn uris(&self) -> Result<Vec<url::Url>, Error> {
        let uris = self
            .candidates()
            .map(|url| url::Url::parse(url).map_err(|_| Error::Uri))
            .collect::<Result<Vec<_>, _>>()?;
        if uris.is_empty() {
            return Err(Error::NoSource);
        }
        Ok(uris)
    }

    /// Whether the preferred URL points at a video file (as opposed to audio or a stream manifest).
    pub fn is_video_file(&self) -> bool {
        let Some(primary) = self.primary() else {
            return false;
        };
        let path = match url::Url::parse(primary) {
            Ok(url) => url.path().to_owned(),
            Err(_) => primary.split(['?', '#']).next().unwrap_or_default().to_owned(),
        };
        path.rsplit_once('.')
            .map(|(_, ext)| {
                VIDEO_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

impl From<&str> for AssetReference {
    fn from(url: &str) -> Self {
        AssetReference::Single(url.to_owned())
    }
}

impl From<String> for AssetReference {
    fn from(url: String) -> Self {
        AssetReference::Single(url)
    }
}

impl From<Vec<String>> for AssetReference {
    fn from(urls: Vec<String>) -> Self {
        AssetReference::Fallbacks(urls)
    }
}

/// Derives candidate URLs for a logical asset path from a delivery base.
#[derive(Debug, Clone)]
pub struct Delivery {
    base: url::Url,
    formats: Vec<String>,
}

impl Delivery {
    /// Creates a resolver for the given base delivery URL, using [`DEFAULT_FORMATS`].
    pub fn new(base: &str) -> Result<Self, Error> {
        let base = url::Url::parse(base).map_err(|_| Error::Uri)?;
        if base.cannot_be_a_base() {
            return Err(Error::Uri);
        }
        Ok(Delivery {
            base,
            formats: DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect(),
        })
    }

    /// Creates a resolver for video uploads on a hosted media cloud account.
    pub fn for_cloud(cloud_name: &str) -> Result<Self, Error> {
        Self::new(&format!(
            "https://res.cloudinary.com/{}/video/upload",
            cloud_name
        ))
    }

    /// Sets the container formats to try, most preferred first.
    pub fn formats<I, S>(self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Delivery {
            formats: formats.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// The base delivery URL.
    pub fn base(&self) -> &url::Url {
        &self.base
    }

    /// Builds one URL per configured format for `path`, preserving format order.
    pub fn resolve(&self, path: &str) -> AssetReference {
        let base = self.base.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        AssetReference::Fallbacks(
            self.formats
                .iter()
                .map(|format| format!("{}/{}.{}", base, path, format))
                .collect(),
        )
    }
}
