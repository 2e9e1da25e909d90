//! Pipeline orchestration: source text in, a [`crate::bytecode::CompiledUnit`]
//! out. Ties the parser crate, the resolver, and the two emitters together.
//!
//! Class scaffolding is always emitted before method bodies, mirroring the
//! `class_emitter`/`method_emitter` split.

use jactl_parser::ast::{Ast, FunDeclId, StmtKind};

use crate::bytecode::{ClassImage, CompiledUnit, MethodImage};
use crate::class_emitter::ClassEmitter;
use crate::descriptor::{ClassDescriptorId, ClassTable};
use crate::diagnostics::DiagnosticsCollector;
use crate::error::{CompileError, CompileErrors, CompileResult};
use crate::method_emitter::MethodEmitter;
use crate::resolver::{Resolver, TypeTable};

/// Compilation knobs . `enable_diagnostics`
/// turns on the thread-local [`DiagnosticsCollector`] for this compile.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub enable_diagnostics: bool,
    /// Script-mode entry point name, mirroring the implicit top-level
    /// function every Jactl script compiles into.
    pub script_class_name: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { enable_diagnostics: false, script_class_name: "Script".into() }
    }
}

/// Compile one Jactl source string into a loadable class image.
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompiledUnit, CompileErrors> {
    if options.enable_diagnostics {
        DiagnosticsCollector::enable();
    } else {
        DiagnosticsCollector::disable();
    }

    let (mut ast, top_level) = jactl_parser::parse(source).map_err(|parse_errors| {
        let mut errors = CompileErrors::new();
        for e in parse_errors.errors() {
            errors.push(CompileError::ParseFailed(e.to_string()));
        }
        errors
    })?;

    let resolver = Resolver::new(&mut ast);
    let resolved = resolver.resolve(&top_level)?;

    let class_emitter = ClassEmitter::new(&resolved.classes);
    let mut class_images = Vec::new();
    for id in 0..resolved.classes.len() {
        let class_id = ClassDescriptorId(id as u32);
        let mut image = class_emitter.emit_shell(class_id)?;
        attach_method_bodies(&mut image, class_id, &resolved.classes, &ast, &resolved.types)?;
        class_images.push(image);
    }

    let script_stmts: Vec<_> = top_level
        .iter()
        .copied()
        .filter(|&stmt| !matches!(ast.stmt(stmt).kind, StmtKind::ClassDecl(_) | StmtKind::FunDecl(_)))
        .collect();
    let emitter = MethodEmitter::new(&ast, &resolved.types, 0, false);
    let (mut script_body, max_locals) = emitter.emit_statements(&script_stmts)?;
    script_body.push(crate::bytecode::Instr::PushNull);
    script_body.push(crate::bytecode::Instr::Return);

    let mut script_methods = vec![MethodImage {
        name: "main".into(),
        descriptor: "()V".into(),
        is_static: true,
        is_async: false,
        max_locals,
        code: script_body,
    }];
    for &stmt in &top_level {
        if let StmtKind::FunDecl(fun_id) = ast.stmt(stmt).kind {
            script_methods.push(compile_method(&ast, &resolved.types, fun_id, true)?);
        }
    }

    let script_class = ClassImage {
        internal_name: options.script_class_name.clone(),
        base_class: None,
        field_names: Vec::new(),
        methods: script_methods,
        inner_classes: class_images,
        constants: Vec::new(),
    };

    Ok(CompiledUnit { script_class })
}

/// Compiles one function/method declaration's body into its [`MethodImage`],
/// the counterpart to [`ClassEmitter::emit_shell`] for the code the class
/// emitter leaves for the method emitter to fill in.
fn compile_method(ast: &Ast, types: &TypeTable, fun_id: FunDeclId, is_static: bool) -> CompileResult<MethodImage> {
    let fun_decl = ast.fun_decl(fun_id);
    let name = fun_decl.name.clone();
    let param_count = fun_decl.params.len();
    let is_async = fun_decl.is_async;
    let body = fun_decl.body;
    let emitter = MethodEmitter::new(ast, types, param_count, is_async);
    let (code, max_locals) = emitter.emit_body(body)?;
    let descriptor = format!("({})Ljava/lang/Object;", "Ljava/lang/Object;".repeat(param_count));
    Ok(MethodImage { name, descriptor, is_static, is_async, max_locals, code })
}

/// Fills in every method body `emit_shell` left as scaffolding, recursing
/// into inner classes in lockstep with `emit_shell`'s own recursion.
fn attach_method_bodies(
    image: &mut ClassImage,
    class_id: ClassDescriptorId,
    classes: &ClassTable,
    ast: &Ast,
    types: &TypeTable,
) -> CompileResult<()> {
    let desc = classes.get(class_id);
    for method in desc.methods.values() {
        image.methods.push(compile_method(ast, types, method.fun_decl, method.is_static)?);
    }
    for (&inner_id, inner_image) in desc.inner_classes.iter().zip(image.inner_classes.iter_mut()) {
        attach_method_bodies(inner_image, inner_id, classes, ast, types)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_trivial_script_without_classes() {
        let options = CompileOptions::default();
        let result = compile("1 + 2", &options);
        assert!(result.is_ok());
    }

    #[test]
    fn undefined_variable_surfaces_as_compile_error() {
        let options = CompileOptions::default();
        let result = compile("x + 1", &options);
        assert!(result.is_err());
    }

    #[test]
    fn top_level_function_body_is_compiled_into_script_class() {
        let options = CompileOptions::default();
        let unit = compile("def f(n) { return n * 2 }", &options).unwrap();
        let f = unit.script_class.methods.iter().find(|m| m.name == "f").expect("f compiled into script class");
        assert!(f.code.iter().any(|i| matches!(i, crate::bytecode::Instr::Return)));
        assert!(f.code.len() > 1, "body should be more than a bare stub");
    }

    #[test]
    fn class_method_body_is_compiled_into_class_image() {
        let options = CompileOptions::default();
        let unit = compile("class Point { int x = 0; def sum(a, b) { return a + b } }", &options).unwrap();
        let point = unit.script_class.inner_classes.iter().find(|c| c.internal_name == "Point").expect("Point emitted");
        let sum = point.methods.iter().find(|m| m.name == "sum").expect("sum compiled");
        assert!(sum.code.iter().any(|i| matches!(i, crate::bytecode::Instr::BinaryOp(_))));
    }
}
