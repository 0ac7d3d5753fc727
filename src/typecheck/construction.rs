use super::{
    arguments::argument_typing_pairs, Assignability, TypeEnv, TypeError, TypeErrorKind,
    TypecheckOptions, Typing,
};
use crate::{
    interface::Params,
    language::{
        ast::{Node, NodeKind},
        types::TypeExpr,
    },
};

/// Bottom-up evaluator that types every node of one tree.
pub struct TypeConstruction<'a, A: Assignability + ?Sized> {
    assignability: &'a mut A,
    options: TypecheckOptions,
    env: TypeEnv,
    typing: Typing,
}

impl<'a, A: Assignability + ?Sized> TypeConstruction<'a, A> {
    pub fn new(assignability: &'a mut A) -> Self {
        Self::with_options(assignability, TypecheckOptions::default())
    }

    pub fn with_options(assignability: &'a mut A, options: TypecheckOptions) -> Self {
        Self {
            assignability,
            options,
            env: TypeEnv::default(),
            typing: Typing::new(),
        }
    }

    pub fn typing(&self) -> &Typing {
        &self.typing
    }

    pub fn env(&self) -> &TypeEnv {
        &self.env
    }

    pub fn into_typing(self) -> Typing {
        self.typing
    }

    pub fn run(&mut self, node: &Node) -> TypeExpr {
        let ty = match &node.kind {
            NodeKind::Begin(children) => {
                let mut last = TypeExpr::Any;
                for child in children {
                    last = self.run(child);
                }
                last
            }
            NodeKind::LocalAssign { name, value } => self.check_assignment(node, name, value),
            NodeKind::LocalVar(name) => self.env.lookup(name).cloned().unwrap_or(TypeExpr::Any),
            NodeKind::Nil | NodeKind::Int(_) | NodeKind::Str(_) | NodeKind::Sym(_) => TypeExpr::Any,
            NodeKind::Send {
                receiver,
                method,
                args,
            } => self.check_send(node, receiver.as_deref(), method, args),
            NodeKind::Hash(elements) => {
                for element in elements {
                    self.run(element);
                }
                TypeExpr::Any
            }
            NodeKind::Pair { value, .. } => {
                self.run(value);
                TypeExpr::Any
            }
            NodeKind::Unsupported { kind, .. } => {
                tracing::debug!(kind = %kind, node = node.id.0, "unsupported node typed as any");
                TypeExpr::Any
            }
        };
        self.typing.add_typing(node, ty)
    }

    fn check_assignment(&mut self, node: &Node, name: &str, value: &Node) -> TypeExpr {
        let rhs_type = self.run(value);
        match self.env.lookup(name).cloned() {
            Some(lhs_type) => {
                if !self.assignability.test(&rhs_type, &lhs_type) {
                    self.typing.add_error(TypeError::new(
                        node,
                        TypeErrorKind::IncompatibleAssignment {
                            lhs_type: lhs_type.clone(),
                            rhs_type,
                        },
                    ));
                }
                lhs_type
            }
            None => {
                self.env.add(name, rhs_type.clone());
                rhs_type
            }
        }
    }

    fn check_send(
        &mut self,
        node: &Node,
        receiver: Option<&Node>,
        method: &str,
        args: &[Node],
    ) -> TypeExpr {
        let receiver_type = match receiver {
            Some(receiver) => self.run(receiver),
            None => self.options.self_type.clone(),
        };

        match self.assignability.method_type(&receiver_type, method) {
            Some(method_type) => {
                self.check_argument_types(node, &method_type.params, args);
                method_type.return_type
            }
            None => {
                self.typing.add_error(TypeError::new(
                    node,
                    TypeErrorKind::NoMethod {
                        method: method.to_string(),
                        receiver_type,
                    },
                ));
                for arg in args {
                    self.run(arg);
                }
                TypeExpr::Any
            }
        }
    }

    fn check_argument_types(&mut self, node: &Node, params: &Params, args: &[Node]) {
        for index in params.missing_arguments(args) {
            self.typing.add_error(TypeError::new(
                node,
                TypeErrorKind::ExpectedArgumentMissing { index },
            ));
        }
        for index in params.extra_arguments(args) {
            self.typing
                .add_error(TypeError::new(node, TypeErrorKind::ExtraArgumentGiven { index }));
        }
        for keyword in params.missing_keywords(args) {
            self.typing.add_error(TypeError::new(
                node,
                TypeErrorKind::ExpectedKeywordMissing { keyword },
            ));
        }
        for keyword in params.extra_keywords(args) {
            self.typing
                .add_error(TypeError::new(node, TypeErrorKind::ExtraKeywordGiven { keyword }));
        }

        for arg in args {
            self.run(arg);
        }

        for (param_type, argument) in argument_typing_pairs(params, args) {
            let arg_type = self
                .typing
                .type_of(argument)
                .cloned()
                .unwrap_or(TypeExpr::Any);
            if !self.assignability.test(&arg_type, param_type) {
                self.typing.add_error(TypeError::new(
                    argument,
                    TypeErrorKind::InvalidArgument {
                        expected: param_type.clone(),
                        actual: arg_type,
                    },
                ));
            }
        }
    }
}
