use std::fmt;

/// A `::`-separated constant path such as `::Foo::Bar` or `Bar`.
///
/// Relative names are resolved against a lexical context by the signature
/// registry; absolute names bypass that search.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName {
    segments: Vec<String>,
    absolute: bool,
}

impl ModuleName {
    pub fn new(segments: Vec<String>, absolute: bool) -> Self {
        Self { segments, absolute }
    }

    /// Splits `text` on `::` without validating identifiers. A leading `::`
    /// marks the name absolute.
    pub fn parse(text: &str) -> Self {
        let (absolute, rest) = match text.strip_prefix("::") {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let segments = rest
            .split("::")
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments, absolute }
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn simple_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Marks the name absolute as written, without any lookup.
    pub fn absolute(&self) -> ModuleName {
        ModuleName {
            segments: self.segments.clone(),
            absolute: true,
        }
    }

    pub fn join(&self, other: &ModuleName) -> ModuleName {
        if other.absolute {
            return other.clone();
        }
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        ModuleName {
            segments,
            absolute: self.absolute,
        }
    }

    /// The enclosing namespace, `None` for the top level.
    pub fn parent(&self) -> Option<ModuleName> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(ModuleName {
            segments,
            absolute: self.absolute,
        })
    }

    pub fn root() -> ModuleName {
        ModuleName {
            segments: Vec::new(),
            absolute: true,
        }
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "::")?;
        }
        write!(f, "{}", self.segments.join("::"))
    }
}

/// Identifies what an interface is built for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeName {
    /// Instances of a class or module.
    Instance(ModuleName),
    /// A module used as a namespace object.
    Module(ModuleName),
    /// A class object; `constructor` adds a synthesized `new`.
    Class { name: ModuleName, constructor: bool },
    /// A standalone interface declaration.
    Interface(ModuleName),
}

impl TypeName {
    pub fn instance(name: &str) -> Self {
        TypeName::Instance(ModuleName::parse(name))
    }

    pub fn module(name: &str) -> Self {
        TypeName::Module(ModuleName::parse(name))
    }

    pub fn class(name: &str, constructor: bool) -> Self {
        TypeName::Class {
            name: ModuleName::parse(name),
            constructor,
        }
    }

    pub fn interface(name: &str) -> Self {
        TypeName::Interface(ModuleName::parse(name))
    }

    pub fn name(&self) -> &ModuleName {
        match self {
            TypeName::Instance(name)
            | TypeName::Module(name)
            | TypeName::Interface(name)
            | TypeName::Class { name, .. } => name,
        }
    }

    pub fn with_name(&self, name: ModuleName) -> TypeName {
        match self {
            TypeName::Instance(_) => TypeName::Instance(name),
            TypeName::Module(_) => TypeName::Module(name),
            TypeName::Interface(_) => TypeName::Interface(name),
            TypeName::Class { constructor, .. } => TypeName::Class {
                name,
                constructor: *constructor,
            },
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Instance(name) | TypeName::Interface(name) => write!(f, "{name}"),
            TypeName::Module(name) => write!(f, "{name}.module"),
            TypeName::Class {
                name,
                constructor: true,
            } => write!(f, "{name}.class constructor"),
            TypeName::Class { name, .. } => write!(f, "{name}.class"),
        }
    }
}
