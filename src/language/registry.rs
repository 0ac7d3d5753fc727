use crate::language::{
    names::ModuleName,
    signature::{ClassDecl, ClassOrModule, ExtensionDecl, InterfaceDecl, ModuleDecl},
};
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Unknown class or module `{name}`")]
    NotFound { name: ModuleName },
    #[error("`{name}` is not a {expected}")]
    KindMismatch {
        name: ModuleName,
        expected: &'static str,
    },
    #[error("`{name}` is declared more than once")]
    Duplicate { name: ModuleName },
}

/// Lookup-by-name over declared signatures.
///
/// Lookups taking `current` resolve relative names from the innermost
/// enclosing namespace outward; absolute names bypass the search.
pub trait SignatureRegistry {
    fn find_class_or_module(
        &self,
        name: &ModuleName,
        current: Option<&ModuleName>,
    ) -> Result<ClassOrModule<'_>, LookupError>;

    fn find_class(
        &self,
        name: &ModuleName,
        current: Option<&ModuleName>,
    ) -> Result<&ClassDecl, LookupError> {
        match self.find_class_or_module(name, current)? {
            ClassOrModule::Class(decl) => Ok(decl),
            ClassOrModule::Module(decl) => Err(LookupError::KindMismatch {
                name: decl.name.clone(),
                expected: "class",
            }),
        }
    }

    fn find_module(
        &self,
        name: &ModuleName,
        current: Option<&ModuleName>,
    ) -> Result<&ModuleDecl, LookupError> {
        match self.find_class_or_module(name, current)? {
            ClassOrModule::Module(decl) => Ok(decl),
            ClassOrModule::Class(decl) => Err(LookupError::KindMismatch {
                name: decl.name.clone(),
                expected: "module",
            }),
        }
    }

    fn find_interface(&self, name: &ModuleName) -> Result<&InterfaceDecl, LookupError>;

    fn find_extensions(&self, name: &ModuleName) -> Vec<&ExtensionDecl>;
}

#[derive(Clone, Debug)]
pub enum Decl {
    Class(ClassDecl),
    Module(ModuleDecl),
    Interface(InterfaceDecl),
    Extension(ExtensionDecl),
}

#[derive(Clone, Debug)]
enum ConstantDecl {
    Class(ClassDecl),
    Module(ModuleDecl),
}

/// In-memory registry keyed by absolute name.
#[derive(Clone, Debug, Default)]
pub struct Signatures {
    constants: IndexMap<ModuleName, ConstantDecl>,
    interfaces: IndexMap<ModuleName, InterfaceDecl>,
    extensions: IndexMap<ModuleName, Vec<ExtensionDecl>>,
}

impl Signatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, decl: Decl) -> Result<(), LookupError> {
        match decl {
            Decl::Class(mut decl) => {
                decl.name = decl.name.absolute();
                let name = decl.name.clone();
                self.insert_constant(name, ConstantDecl::Class(decl))
            }
            Decl::Module(mut decl) => {
                decl.name = decl.name.absolute();
                let name = decl.name.clone();
                self.insert_constant(name, ConstantDecl::Module(decl))
            }
            Decl::Interface(mut decl) => {
                decl.name = decl.name.absolute();
                if self.interfaces.contains_key(&decl.name) {
                    return Err(LookupError::Duplicate { name: decl.name });
                }
                self.interfaces.insert(decl.name.clone(), decl);
                Ok(())
            }
            Decl::Extension(mut decl) => {
                decl.module_name = decl.module_name.absolute();
                self.extensions
                    .entry(decl.module_name.clone())
                    .or_default()
                    .push(decl);
                Ok(())
            }
        }
    }

    pub fn extend(&mut self, decls: impl IntoIterator<Item = Decl>) -> Result<(), LookupError> {
        for decl in decls {
            self.add(decl)?;
        }
        Ok(())
    }

    fn insert_constant(&mut self, name: ModuleName, decl: ConstantDecl) -> Result<(), LookupError> {
        if self.constants.contains_key(&name) {
            return Err(LookupError::Duplicate { name });
        }
        self.constants.insert(name, decl);
        Ok(())
    }

    fn resolve_constant(
        &self,
        name: &ModuleName,
        current: Option<&ModuleName>,
    ) -> Option<&ConstantDecl> {
        let scope = match current {
            Some(current) if !name.is_absolute() => current.absolute(),
            _ => return self.constants.get(&name.absolute()),
        };
        let mut scope = Some(scope);
        while let Some(namespace) = scope {
            if let Some(decl) = self.constants.get(&namespace.join(name)) {
                return Some(decl);
            }
            scope = namespace.parent();
        }
        None
    }
}

impl SignatureRegistry for Signatures {
    fn find_class_or_module(
        &self,
        name: &ModuleName,
        current: Option<&ModuleName>,
    ) -> Result<ClassOrModule<'_>, LookupError> {
        match self.resolve_constant(name, current) {
            Some(ConstantDecl::Class(decl)) => Ok(ClassOrModule::Class(decl)),
            Some(ConstantDecl::Module(decl)) => Ok(ClassOrModule::Module(decl)),
            None => Err(LookupError::NotFound { name: name.clone() }),
        }
    }

    fn find_interface(&self, name: &ModuleName) -> Result<&InterfaceDecl, LookupError> {
        self.interfaces
            .get(&name.absolute())
            .ok_or_else(|| LookupError::NotFound { name: name.clone() })
    }

    fn find_extensions(&self, name: &ModuleName) -> Vec<&ExtensionDecl> {
        self.extensions
            .get(&name.absolute())
            .map(|exts| exts.iter().collect())
            .unwrap_or_default()
    }
}
