use std::fmt;
use std::str::FromStr;

/// A ranked list the data source maintains independently of the others.
///
/// The string form is the path segment of the list endpoint, e.g.
/// `topstories` for `/topstories.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Top,
        Category::New,
        Category::Best,
        Category::Ask,
        Category::Show,
        Category::Job,
    ];

    /// The categories a fresh session loads and polls, in iteration order.
    pub const DEFAULT: [Category; 3] = [Category::Top, Category::Job, Category::New];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Top => "topstories",
            Self::New => "newstories",
            Self::Best => "beststories",
            Self::Ask => "askstories",
            Self::Show => "showstories",
            Self::Job => "jobstories",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.path().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(Category::path).collect();
                format!("unknown category `{s}` (expected one of: {})", known.join(", "))
            })
    }
}
