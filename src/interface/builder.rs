use super::{
    error::{BuildError, BuildResult},
    Block, Interface, Method, MethodType, Params,
};
use crate::language::{
    names::{ModuleName, TypeName},
    registry::{LookupError, SignatureRegistry},
    signature::{
        ClassDecl, ClassOrModule, InterfaceDecl, Member, MethodMember, MethodTypeDecl,
        MixinMember, ModuleDecl, ParamDecl, ParamsDecl,
    },
    types::{Substitution, TypeExpr},
};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Names of the well-known root declarations.
#[derive(Clone, Debug)]
pub struct BuilderOptions {
    pub basic_object: ModuleName,
    pub object: ModuleName,
    pub module: ModuleName,
    pub class: ModuleName,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            basic_object: ModuleName::parse("::BasicObject"),
            object: ModuleName::parse("::Object"),
            module: ModuleName::parse("::Module"),
            class: ModuleName::parse("::Class"),
        }
    }
}

/// A lookup that failed during name resolution and was tolerated.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolutionFailure {
    pub type_name: TypeName,
    pub current: ModuleName,
    pub error: LookupError,
}

#[derive(Debug)]
enum CacheEntry {
    InProgress,
    Done(Rc<Interface>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum MixinSide {
    Instance,
    Singleton,
}

type MethodTable = IndexMap<String, Method>;

/// Builds and memoizes interfaces for one checking session.
pub struct Builder<'s, R: SignatureRegistry + ?Sized> {
    signatures: &'s R,
    options: BuilderOptions,
    cache: FxHashMap<TypeName, CacheEntry>,
    resolution_failures: Vec<ResolutionFailure>,
}

impl<'s, R: SignatureRegistry + ?Sized> Builder<'s, R> {
    pub fn new(signatures: &'s R) -> Self {
        Self::with_options(signatures, BuilderOptions::default())
    }

    pub fn with_options(signatures: &'s R, options: BuilderOptions) -> Self {
        Self {
            signatures,
            options,
            cache: FxHashMap::default(),
            resolution_failures: Vec::new(),
        }
    }

    pub fn signatures(&self) -> &'s R {
        self.signatures
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    pub fn resolution_failures(&self) -> &[ResolutionFailure] {
        &self.resolution_failures
    }

    #[tracing::instrument(level = "trace", skip_all, fields(type_name = %type_name))]
    pub fn build(
        &mut self,
        type_name: &TypeName,
        current: Option<&ModuleName>,
    ) -> BuildResult<Rc<Interface>> {
        let type_name = self.absolute_type_name(type_name, current);
        match self.cache.get(&type_name) {
            Some(CacheEntry::Done(interface)) => {
                tracing::trace!(%type_name, "interface cache hit");
                return Ok(Rc::clone(interface));
            }
            Some(CacheEntry::InProgress) => return Err(BuildError::recursive(type_name)),
            None => {}
        }

        self.cache.insert(type_name.clone(), CacheEntry::InProgress);
        match self.build_uncached(&type_name) {
            Ok(interface) => {
                tracing::debug!(%type_name, methods = interface.methods.len(), "built interface");
                let interface = Rc::new(interface);
                self.cache
                    .insert(type_name, CacheEntry::Done(Rc::clone(&interface)));
                Ok(interface)
            }
            Err(err) => {
                self.cache.remove(&type_name);
                Err(err.within(&type_name))
            }
        }
    }

    fn build_uncached(&mut self, type_name: &TypeName) -> BuildResult<Interface> {
        let signatures = self.signatures;
        let unknown = |source| BuildError::UnknownType {
            type_name: type_name.clone(),
            source,
        };
        match type_name {
            TypeName::Instance(name) => {
                let sig = signatures.find_class_or_module(name, None).map_err(unknown)?;
                self.instance_to_interface(sig)
            }
            TypeName::Module(name) => {
                let sig = signatures.find_module(name, None).map_err(unknown)?;
                self.module_to_interface(sig)
            }
            TypeName::Class { name, constructor } => {
                let sig = signatures.find_class(name, None).map_err(unknown)?;
                self.class_to_interface(sig, *constructor)
            }
            TypeName::Interface(name) => {
                let sig = signatures.find_interface(name).map_err(unknown)?;
                Ok(self.interface_to_interface(sig))
            }
        }
    }

    /// Resolves `type_name` against the lexical context `current`. Without a
    /// context the name is taken as already absolute. Failed lookups leave the
    /// name as written and are recorded in `resolution_failures`.
    pub fn absolute_type_name(
        &mut self,
        type_name: &TypeName,
        current: Option<&ModuleName>,
    ) -> TypeName {
        let current = match current {
            Some(current) => current,
            None => return type_name.with_name(type_name.name().absolute()),
        };
        let signatures = self.signatures;
        let resolved = match type_name {
            TypeName::Instance(name) => signatures
                .find_class_or_module(name, Some(current))
                .map(|sig| sig.name().clone()),
            TypeName::Module(name) => signatures
                .find_module(name, Some(current))
                .map(|sig| sig.name.clone()),
            TypeName::Class { name, .. } => signatures
                .find_class(name, Some(current))
                .map(|sig| sig.name.clone()),
            TypeName::Interface(name) => Ok(name.absolute()),
        };
        match resolved {
            Ok(name) => type_name.with_name(name),
            Err(error) => {
                tracing::warn!(%type_name, %current, %error, "cannot find absolute type name");
                self.resolution_failures.push(ResolutionFailure {
                    type_name: type_name.clone(),
                    current: current.clone(),
                    error,
                });
                type_name.clone()
            }
        }
    }

    pub fn absolute_type(&mut self, ty: &TypeExpr, current: Option<&ModuleName>) -> TypeExpr {
        ty.map_names(&mut |name| self.absolute_type_name(name, current))
    }

    fn absolute_types(&mut self, types: &[TypeExpr], current: Option<&ModuleName>) -> Vec<TypeExpr> {
        types
            .iter()
            .map(|ty| self.absolute_type(ty, current))
            .collect()
    }

    pub fn merge_mixin(
        &mut self,
        type_name: &TypeName,
        args: &[TypeExpr],
        methods: &mut MethodTable,
        supers: &mut Vec<TypeExpr>,
        current: &ModuleName,
    ) -> BuildResult<()> {
        let mixed = self.build(type_name, Some(current))?;
        merge_interface(&mixed, args, methods, supers);
        Ok(())
    }

    fn merge_mixins(
        &mut self,
        members: &[Member],
        current: &ModuleName,
        side: MixinSide,
        methods: &mut MethodTable,
        supers: &mut Vec<TypeExpr>,
    ) -> BuildResult<()> {
        for member in members {
            let (mixin, type_name): (&MixinMember, TypeName) = match (side, member) {
                (MixinSide::Instance, Member::Include(mixin)) => {
                    (mixin, TypeName::Instance(mixin.name.clone()))
                }
                (MixinSide::Singleton, Member::Include(mixin)) => {
                    (mixin, TypeName::Module(mixin.name.clone()))
                }
                (MixinSide::Singleton, Member::Extend(mixin)) => {
                    (mixin, TypeName::Instance(mixin.name.clone()))
                }
                _ => continue,
            };
            let args = self.absolute_types(&mixin.args, Some(current));
            self.merge_mixin(&type_name, &args, methods, supers, current)?;
        }
        Ok(())
    }

    pub fn add_method(&mut self, type_name: &TypeName, member: &MethodMember, methods: &mut MethodTable) {
        let current = type_name.name().clone();
        let types = member
            .types
            .iter()
            .map(|method_type| self.method_type_to_method_type(method_type, None, Some(&current)))
            .collect();
        let super_method = methods.get(&member.name).cloned();
        let new_method = Method {
            type_name: type_name.clone(),
            name: member.name.clone(),
            types,
            super_method: super_method.clone().map(Rc::new),
            attributes: member.attributes.clone(),
        };
        match super_method {
            Some(existing) if existing.include_in_chain(&new_method) => {}
            _ => {
                methods.insert(member.name.clone(), new_method);
            }
        }
    }

    fn class_to_interface(&mut self, sig: &ClassDecl, constructor: bool) -> BuildResult<Interface> {
        let type_name = TypeName::Class {
            name: sig.name.clone(),
            constructor,
        };
        let mut supers = Vec::new();
        let mut methods = MethodTable::new();

        let class_name = TypeName::Instance(self.options.class.clone());
        let klass = self.build(&class_name, None)?;
        methods.extend(
            klass
                .instantiate(&[TypeExpr::Instance], &Substitution::polymorphic())
                .methods,
        );

        if sig.name != self.options.basic_object {
            let super_class_name = sig
                .super_class
                .as_ref()
                .map(|super_class| super_class.name.clone())
                .unwrap_or_else(|| self.options.object.clone());
            self.merge_mixin(
                &TypeName::Class {
                    name: super_class_name,
                    constructor,
                },
                &[],
                &mut methods,
                &mut supers,
                &sig.name,
            )?;
        }

        self.merge_mixins(
            &sig.members,
            &sig.name,
            MixinSide::Singleton,
            &mut methods,
            &mut supers,
        )?;

        for member in &sig.members {
            let Member::Method(method) = member else {
                continue;
            };
            if method.is_module_method() {
                self.add_method(&type_name, method, &mut methods);
            } else if method.is_instance_method() && method.name == "initialize" && constructor {
                let types = method
                    .types
                    .iter()
                    .map(|method_type| {
                        self.method_type_to_method_type(
                            method_type,
                            Some(TypeExpr::Instance),
                            Some(&sig.name),
                        )
                    })
                    .collect();
                methods.insert(
                    "new".to_string(),
                    Method {
                        type_name: type_name.clone(),
                        name: "new".to_string(),
                        types,
                        super_method: None,
                        attributes: Vec::new(),
                    },
                );
            }
        }

        if !constructor {
            methods.shift_remove("new");
        }

        Ok(Interface {
            name: type_name,
            params: sig.params.clone(),
            methods,
            supers,
        })
    }

    fn module_to_interface(&mut self, sig: &ModuleDecl) -> BuildResult<Interface> {
        let type_name = TypeName::Module(sig.name.clone());
        let mut supers: Vec<TypeExpr> = match &sig.self_type {
            Some(self_type) => vec![self.absolute_type(self_type, Some(&sig.name))],
            None => Vec::new(),
        };
        let mut methods = MethodTable::new();

        let module_name = TypeName::Instance(self.options.module.clone());
        let module_instance = self.build(&module_name, None)?;
        methods.extend(
            module_instance
                .instantiate(&[], &Substitution::polymorphic())
                .methods,
        );

        self.merge_mixins(
            &sig.members,
            &sig.name,
            MixinSide::Singleton,
            &mut methods,
            &mut supers,
        )?;

        for member in &sig.members {
            if let Member::Method(method) = member {
                if method.is_module_method() {
                    self.add_method(&type_name, method, &mut methods);
                }
            }
        }

        Ok(Interface {
            name: type_name,
            params: sig.params.clone(),
            methods,
            supers,
        })
    }

    fn instance_to_interface(&mut self, sig: ClassOrModule<'s>) -> BuildResult<Interface> {
        let name = sig.name();
        let type_name = TypeName::Instance(name.clone());
        let mut supers = Vec::new();
        let mut methods = MethodTable::new();

        match sig {
            ClassOrModule::Class(decl) if decl.name != self.options.basic_object => {
                let (super_class_name, super_args) = match &decl.super_class {
                    Some(super_class) => (super_class.name.clone(), super_class.args.as_slice()),
                    None => (self.options.object.clone(), &[][..]),
                };
                let super_interface =
                    self.build(&TypeName::Instance(super_class_name), Some(name))?;
                let args = self.absolute_types(super_args, Some(name));
                let instantiated =
                    super_interface.instantiate(&args, &Substitution::polymorphic());
                supers.extend(instantiated.supers);
                methods.extend(instantiated.methods);
            }
            ClassOrModule::Class(_) => {}
            ClassOrModule::Module(decl) => {
                if let Some(self_type) = &decl.self_type {
                    supers.push(self.absolute_type(self_type, Some(name)));
                }
            }
        }

        self.merge_mixins(
            sig.members(),
            name,
            MixinSide::Instance,
            &mut methods,
            &mut supers,
        )?;

        for member in sig.members() {
            if let Member::Method(method) = member {
                if method.is_instance_method() && method.name != "initialize" {
                    self.add_method(&type_name, method, &mut methods);
                }
            }
        }

        let signatures = self.signatures;
        for extension in signatures.find_extensions(name) {
            for member in &extension.members {
                if let Member::Method(method) = member {
                    if method.is_instance_method() {
                        self.add_method(&type_name, method, &mut methods);
                    }
                }
            }
        }

        Ok(Interface {
            name: type_name,
            params: sig.params().to_vec(),
            methods,
            supers,
        })
    }

    fn interface_to_interface(&mut self, sig: &InterfaceDecl) -> Interface {
        let type_name = TypeName::Interface(sig.name.clone());
        let mut methods = MethodTable::new();
        for method in &sig.methods {
            let types = method
                .types
                .iter()
                .map(|method_type| self.method_type_to_method_type(method_type, None, None))
                .collect();
            methods.insert(
                method.name.clone(),
                Method {
                    type_name: type_name.clone(),
                    name: method.name.clone(),
                    types,
                    super_method: None,
                    attributes: method.attributes.clone(),
                },
            );
        }

        Interface {
            name: type_name,
            params: sig.params.clone(),
            methods,
            supers: Vec::new(),
        }
    }

    pub fn method_type_to_method_type(
        &mut self,
        method_type: &MethodTypeDecl,
        return_type_override: Option<TypeExpr>,
        current: Option<&ModuleName>,
    ) -> MethodType {
        let params = self.params_to_params(method_type.params.as_deref(), current);
        let block = method_type.block.as_ref().map(|block| Block {
            params: self.params_to_params(block.params.as_deref(), current),
            return_type: self.absolute_type(&block.return_type, current),
        });
        let return_type = match return_type_override {
            Some(ty) => ty,
            None => self.absolute_type(&method_type.return_type, current),
        };

        MethodType {
            type_params: method_type.type_params.clone(),
            params,
            return_type,
            block,
            span: method_type.span,
        }
    }

    /// Flattens a parameter chain. Nothing after a rest-keyword parameter is
    /// read.
    pub fn params_to_params(
        &mut self,
        params: Option<&ParamsDecl>,
        current: Option<&ModuleName>,
    ) -> Params {
        let mut result = Params::default();
        let Some(params) = params else {
            return result;
        };
        for param in params.iter() {
            match param {
                ParamDecl::Required(ty) => result.required.push(self.absolute_type(ty, current)),
                ParamDecl::Optional(ty) => result.optional.push(self.absolute_type(ty, current)),
                ParamDecl::Rest(ty) => result.rest = Some(self.absolute_type(ty, current)),
                ParamDecl::RequiredKeyword(name, ty) => {
                    let ty = self.absolute_type(ty, current);
                    result.required_keywords.insert(name.clone(), ty);
                }
                ParamDecl::OptionalKeyword(name, ty) => {
                    let ty = self.absolute_type(ty, current);
                    result.optional_keywords.insert(name.clone(), ty);
                }
                ParamDecl::RestKeyword(ty) => {
                    result.rest_keywords = Some(self.absolute_type(ty, current));
                    break;
                }
            }
        }
        result
    }
}

/// Merges an already built interface into `methods`, keeping an existing
/// method when it already covers the incoming one and otherwise linking the
/// existing one as the incoming method's super.
pub fn merge_interface(
    mixed: &Interface,
    args: &[TypeExpr],
    methods: &mut MethodTable,
    supers: &mut Vec<TypeExpr>,
) {
    let instantiated = mixed.instantiate(args, &Substitution::polymorphic());
    supers.extend(instantiated.supers);
    for (name, new_method) in instantiated.methods {
        match methods.get(&name) {
            Some(existing) if existing.include_in_chain(&new_method) => {}
            Some(existing) => {
                let linked = new_method.with_super(existing.clone());
                methods.insert(name, linked);
            }
            None => {
                methods.insert(name, new_method);
            }
        }
    }
}
