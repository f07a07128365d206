//! Semantic analysis: from parsed [`Program`] to [`CompiledFile`]
//!
//! - Struct declarations become [`StructDef`]s with resolved field types.
//!   A struct reached through a pointer stays [`Type::Named`], so a node type
//!   may point at itself; a struct containing itself by value is rejected.
//! - Each function gets its [`FrameInventory`]: parameters first, then every
//!   local declared anywhere in the body in order of first declaration.
//! - Bodies are rewritten so that a call argument naming a struct becomes a
//!   type node (`malloc(Node)`), and a callee naming a builtin becomes a
//!   builtin reference unless a local or user function shadows it.

use crate::parser::ast::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::rc::Rc;

/// Analysis error type
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    UnknownType { name: String, location: SourceLocation },
    DuplicateFunction { name: String, location: SourceLocation },
    DuplicateStruct { name: String, location: SourceLocation },
    RecursiveStruct { name: String, location: SourceLocation },
    VoidVariable { name: String, location: SourceLocation },
}

impl AnalysisError {
    pub fn location(&self) -> SourceLocation {
        match self {
            AnalysisError::UnknownType { location, .. }
            | AnalysisError::DuplicateFunction { location, .. }
            | AnalysisError::DuplicateStruct { location, .. }
            | AnalysisError::RecursiveStruct { location, .. }
            | AnalysisError::VoidVariable { location, .. } => *location,
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.location();
        write!(
            f,
            "Analysis error at line {}, column {}: ",
            location.line, location.column
        )?;
        match self {
            AnalysisError::UnknownType { name, .. } => write!(f, "unknown type '{}'", name),
            AnalysisError::DuplicateFunction { name, .. } => {
                write!(f, "function '{}' is defined more than once", name)
            }
            AnalysisError::DuplicateStruct { name, .. } => {
                write!(f, "struct '{}' is defined more than once", name)
            }
            AnalysisError::RecursiveStruct { name, .. } => {
                write!(f, "struct '{}' contains itself by value", name)
            }
            AnalysisError::VoidVariable { name, .. } => {
                write!(f, "variable '{}' declared void", name)
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Resolve types, build frame inventories and annotate function bodies
pub fn analyze(program: &Program, source: &str) -> Result<CompiledFile, AnalysisError> {
    Analyzer::new(program, source)?.compile(program)
}

struct Analyzer<'a> {
    structs: FxHashMap<&'a str, &'a StructDecl>,
    functions: FxHashSet<&'a str>,
    lines: LineIndex,
}

impl<'a> Analyzer<'a> {
    fn new(program: &'a Program, source: &str) -> Result<Self, AnalysisError> {
        let lines = LineIndex::new(source);
        let mut structs = FxHashMap::default();
        let mut functions = FxHashSet::default();

        for node in &program.nodes {
            match node {
                TopLevel::Struct(decl) => {
                    if structs.insert(decl.name.as_str(), decl).is_some() {
                        return Err(AnalysisError::DuplicateStruct {
                            name: decl.name.clone(),
                            location: lines.locate(decl.span.start),
                        });
                    }
                }
                TopLevel::Function(decl) => {
                    if !functions.insert(decl.name.as_str()) {
                        return Err(AnalysisError::DuplicateFunction {
                            name: decl.name.clone(),
                            location: lines.locate(decl.span.start),
                        });
                    }
                }
            }
        }

        Ok(Analyzer {
            structs,
            functions,
            lines,
        })
    }

    fn compile(&self, program: &Program) -> Result<CompiledFile, AnalysisError> {
        let mut file = CompiledFile::default();

        for node in &program.nodes {
            let decl = match node {
                TopLevel::Struct(decl) => Decl::Struct(Rc::new(self.struct_def(decl)?)),
                TopLevel::Function(decl) => Decl::Function(Rc::new(self.function_def(decl)?)),
            };
            file.decls.push(decl);
        }

        Ok(file)
    }

    fn struct_def(&self, decl: &StructDecl) -> Result<StructDef, AnalysisError> {
        Ok(StructDef {
            name: decl.name.clone(),
            fields: self.struct_fields(&decl.name, decl.span, &mut Vec::new())?,
            span: decl.span,
        })
    }

    fn function_def(&self, decl: &FunctionDecl) -> Result<FunctionDef, AnalysisError> {
        let return_type = self.resolve(&decl.return_type)?;

        let mut frame = FrameInventory::new();
        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = self.resolve_variable(&param.name, &param.ty)?;
            frame.insert(param.name.clone(), ty.clone());
            params.push(Param {
                name: param.name.clone(),
                ty,
            });
        }
        self.collect_locals(&decl.body, &mut frame)?;

        let body = self.annotate(&decl.body, &frame)?;

        Ok(FunctionDef {
            name: decl.name.clone(),
            return_type,
            params,
            body,
            frame,
            position: decl.span,
        })
    }

    /// Record every declaration in `node` into `frame`
    fn collect_locals(&self, node: &Node, frame: &mut FrameInventory) -> Result<(), AnalysisError> {
        match node {
            Node::Decl { name, ty, .. } => {
                let ty = self.resolve_variable(name, ty)?;
                frame.insert(name.clone(), ty);
            }
            Node::Block(stmts) => {
                for stmt in stmts.iter() {
                    self.collect_locals(stmt, frame)?;
                }
            }
            Node::Steppoint { stmt, .. } => self.collect_locals(stmt, frame)?,
            Node::Loop { body, .. } => self.collect_locals(body, frame)?,
            _ => {}
        }
        Ok(())
    }

    /// Rebuild `node` with struct-named arguments and builtin callees resolved
    fn annotate(&self, node: &NodeRef, frame: &FrameInventory) -> Result<NodeRef, AnalysisError> {
        let rebuilt = match node.as_ref() {
            Node::Literal(_) | Node::Var(_) | Node::Builtin(_) | Node::Nop | Node::Type(_) => {
                return Ok(node.clone());
            }
            // Initializers are never run; keep them as written
            Node::Decl { .. } => return Ok(node.clone()),
            Node::Block(stmts) => Node::Block(self.annotate_all(stmts, frame)?),
            Node::Unary { op, operand } => Node::Unary {
                op: *op,
                operand: self.annotate(operand, frame)?,
            },
            Node::Binary { op, left, right } => Node::Binary {
                op: *op,
                left: self.annotate(left, frame)?,
                right: self.annotate(right, frame)?,
            },
            Node::Member { base, field } => Node::Member {
                base: self.annotate(base, frame)?,
                field: field.clone(),
            },
            Node::Index { base, index } => Node::Index {
                base: self.annotate(base, frame)?,
                index: self.annotate(index, frame)?,
            },
            Node::Deref(inner) => Node::Deref(self.annotate(inner, frame)?),
            Node::Return(value) => Node::Return(match value {
                Some(value) => Some(self.annotate(value, frame)?),
                None => None,
            }),
            Node::Call { callee, args } => Node::Call {
                callee: self.annotate_callee(callee, frame)?,
                args: args
                    .iter()
                    .map(|arg| self.annotate_argument(arg, frame))
                    .collect::<Result<_, _>>()?,
            },
            Node::Steppoint { span, stmt } => Node::Steppoint {
                span: *span,
                stmt: self.annotate(stmt, frame)?,
            },
            Node::Loop { cond, body } => Node::Loop {
                cond: self.annotate(cond, frame)?,
                body: self.annotate(body, frame)?,
            },
        };
        Ok(Rc::new(rebuilt))
    }

    fn annotate_all(
        &self,
        nodes: &[NodeRef],
        frame: &FrameInventory,
    ) -> Result<Rc<[NodeRef]>, AnalysisError> {
        nodes.iter().map(|n| self.annotate(n, frame)).collect()
    }

    fn annotate_callee(
        &self,
        callee: &NodeRef,
        frame: &FrameInventory,
    ) -> Result<NodeRef, AnalysisError> {
        if let Node::Var(name) = callee.as_ref() {
            if !frame.contains(name) && !self.functions.contains(name.as_str()) {
                if let Some(builtin) = Builtin::from_name(name) {
                    return Ok(Rc::new(Node::Builtin(builtin)));
                }
            }
        }
        self.annotate(callee, frame)
    }

    fn annotate_argument(
        &self,
        arg: &NodeRef,
        frame: &FrameInventory,
    ) -> Result<NodeRef, AnalysisError> {
        if let Node::Var(name) = arg.as_ref() {
            if let Some(decl) = self.structs.get(name.as_str()).filter(|_| !frame.contains(name)) {
                let fields = self.struct_fields(name, decl.span, &mut Vec::new())?;
                return Ok(type_node(&Type::Struct {
                    name: name.clone(),
                    fields,
                }));
            }
        }
        self.annotate(arg, frame)
    }

    /// Resolve the type of a variable; `void` is only valid behind a pointer
    fn resolve_variable(&self, name: &str, spec: &TypeSpec) -> Result<Type, AnalysisError> {
        if spec.name == TypeName::Base(BaseType::Void) && spec.pointer_depth == 0 {
            return Err(AnalysisError::VoidVariable {
                name: name.to_string(),
                location: self.lines.locate(spec.span.start),
            });
        }
        self.resolve(spec)
    }

    fn resolve(&self, spec: &TypeSpec) -> Result<Type, AnalysisError> {
        let mut ty = match &spec.name {
            TypeName::Base(base) => Type::Base(*base),
            TypeName::Struct(name) if spec.pointer_depth > 0 => {
                if !self.structs.contains_key(name.as_str()) {
                    return Err(AnalysisError::UnknownType {
                        name: name.clone(),
                        location: self.lines.locate(spec.span.start),
                    });
                }
                Type::Named(name.clone())
            }
            TypeName::Struct(name) => Type::Struct {
                name: name.clone(),
                fields: self.struct_fields(name, spec.span, &mut Vec::new())?,
            },
        };

        for _ in 0..spec.pointer_depth {
            ty = Type::Pointer(Box::new(ty));
        }
        // int a[2][3] is an array of 2 arrays of 3 ints
        for dim in spec.array_dims.iter().rev() {
            ty = Type::Array(Box::new(ty), *dim);
        }

        Ok(ty)
    }

    /// Resolve the fields of a struct held by value; `visiting` holds the
    /// structs currently being expanded.
    fn struct_fields<'n>(
        &self,
        name: &'n str,
        span: Span,
        visiting: &mut Vec<&'n str>,
    ) -> Result<Vec<(String, Type)>, AnalysisError>
    where
        'a: 'n,
    {
        let decl: &'a StructDecl =
            self.structs
                .get(name)
                .copied()
                .ok_or_else(|| AnalysisError::UnknownType {
                    name: name.to_string(),
                    location: self.lines.locate(span.start),
                })?;

        if visiting.contains(&name) {
            return Err(AnalysisError::RecursiveStruct {
                name: name.to_string(),
                location: self.lines.locate(decl.span.start),
            });
        }
        visiting.push(name);

        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let ty = match &field.ty.name {
                TypeName::Struct(inner) if field.ty.pointer_depth == 0 => {
                    let mut ty = Type::Struct {
                        name: inner.clone(),
                        fields: self.struct_fields(inner, field.ty.span, visiting)?,
                    };
                    for dim in field.ty.array_dims.iter().rev() {
                        ty = Type::Array(Box::new(ty), *dim);
                    }
                    ty
                }
                _ => self.resolve_variable(&field.name, &field.ty)?,
            };
            fields.push((field.name.clone(), ty));
        }

        visiting.pop();
        Ok(fields)
    }
}

/// Type constructor node that rebuilds `ty` when stepped
pub(crate) fn type_node(ty: &Type) -> NodeRef {
    let expr = match ty {
        Type::Base(base) => TypeExpr::Base(*base),
        Type::Named(name) => TypeExpr::Named(name.clone()),
        Type::Pointer(inner) => TypeExpr::Pointer(type_node(inner)),
        Type::Array(element, size) => TypeExpr::Array {
            element: type_node(element),
            size: Rc::new(Node::int(*size as i64)),
        },
        Type::Struct { name, fields } => TypeExpr::Struct {
            name: name.clone(),
            fields: fields
                .iter()
                .map(|(field, ty)| (field.clone(), type_node(ty)))
                .collect(),
        },
    };
    Rc::new(Node::Type(expr))
}
