use std::fmt;
use std::panic::Location;

/// Call-site provenance of a tracked memory operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Site {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
    /// Enclosing module, when captured through [`here!`](crate::here).
    pub module: Option<&'static str>,
}

impl Site {
    /// Site of the caller of the (`#[track_caller]`) function this runs in.
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(loc: &'static Location<'static>) -> Self {
        Self {
            file: loc.file(),
            line: loc.line(),
            column: loc.column(),
            module: None,
        }
    }

    pub const fn new(file: &'static str, line: u32, column: u32, module: &'static str) -> Self {
        Self {
            file,
            line,
            column,
            module: Some(module),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)?;
        if let Some(module) = self.module {
            write!(f, " ({module})")?;
        }
        Ok(())
    }
}

/// Captures the current file, line, column and module as a [`Site`].
#[macro_export]
macro_rules! here {
    () => {
        $crate::memory::Site::new(file!(), line!(), column!(), module_path!())
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn whoami() -> Site {
        Site::caller()
    }

    #[test]
    fn caller_points_at_the_call_site() {
        let line = line!() + 1;
        let site = whoami();
        assert_eq!(site.line, line);
        assert!(site.file.ends_with("site.rs"));
        assert_eq!(site.module, None);
    }

    #[test]
    fn here_records_the_module() {
        let site = crate::here!();
        assert_eq!(site.module, Some(module_path!()));
        assert!(site.to_string().contains("site.rs:"));
        assert!(site.to_string().ends_with(&format!("({})", module_path!())));
    }
}
