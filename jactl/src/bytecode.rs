//! The emitted class image and the checkpoint/restore wire
//! format.
//!
//! A magic-and-version-tagged binary container, serialized with `bincode`
//! over a `serde`-derived payload type, with save/load helpers around a
//! plain `std::fs::File`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Magic bytes identifying a Jactl class image file.
pub const MAGIC: &[u8; 4] = b"JACL";

/// Current class-image format version.
pub const VERSION: u32 = 1;

#[derive(Debug)]
pub enum BytecodeError {
    Io(std::io::Error),
    InvalidMagic,
    UnsupportedVersion(u32),
    Serialize(String),
    Deserialize(String),
}

impl std::fmt::Display for BytecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BytecodeError::Io(e) => write!(f, "I/O error: {e}"),
            BytecodeError::InvalidMagic => write!(f, "not a Jactl class image (bad magic)"),
            BytecodeError::UnsupportedVersion(v) => write!(f, "unsupported class image version {v}"),
            BytecodeError::Serialize(e) => write!(f, "serialize error: {e}"),
            BytecodeError::Deserialize(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for BytecodeError {}

impl From<std::io::Error> for BytecodeError {
    fn from(e: std::io::Error) -> Self {
        BytecodeError::Io(e)
    }
}

/// A single bytecode instruction . Operands that reference a
/// class, method, field, or constant are named rather than indexed, since
/// the (external) class loader resolves them at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instr {
    // ---- constants / locals ----
    PushNull,
    PushBool(bool),
    PushByte(u8),
    PushInt(i32),
    PushLong(i64),
    PushDouble(f64),
    PushString(String),
    LoadLocal(usize),
    StoreLocal(usize),

    // ---- stack shape (operand tracker contract) ----
    Pop,
    Dup,
    Dup2,
    Swap,
    Swap2,

    // ---- containers ----
    NewList(usize),
    NewMap(usize),

    // ---- field path ----
    LoadField { is_dot: bool, is_optional: bool, create_if_missing: bool },
    StoreField { is_dot: bool, is_optional: bool, create_if_missing: bool },

    // ---- operators ----
    BinaryOp(crate::types::OpTag),
    Negate,
    Not,
    BitNot,

    // ---- control flow ----
    Label(u32),
    Jump(u32),
    JumpIfFalse(u32),
    JumpIfTrue(u32),
    LineNumber(u32),

    // ---- calls ----
    /// Known user function, full positional args.
    CallDirect { class: String, method: String, arg_count: usize },
    /// Call via the uniform wrapper signature.
    CallWrapper { class: String, method: String },
    /// `invokeMethodOrField` dynamic dispatch on an `Any` parent.
    CallDynamic { name: String, must_be_field: bool, is_optional: bool },

    New { class: String, arg_count: usize },
    InstanceOf { class: String },

    Convert { target: String, could_be_null: bool },
    ConvertToBoolean { negated: bool },
    ThrowIfNull { message: String },

    Return,
    Print { newline: bool },
    Die,

    // ---- async continuation protocol ----
    /// Marks a suspend point; the emitter wraps the preceding call in the
    /// try/catch-Continuation protocol.
    SuspendPoint { resume_location_id: u32 },
    SaveLocals { longs_slot: usize, objects_slot: usize },
    RestoreLocals { longs_slot: usize, objects_slot: usize },
}

/// A method body plus its frame-sizing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodImage {
    pub name: String,
    pub descriptor: String,
    pub is_static: bool,
    pub is_async: bool,
    pub max_locals: usize,
    pub code: Vec<Instr>,
}

/// One emitted class: the scaffolding the class emitter
/// produces plus every method body the method emitter produced for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassImage {
    pub internal_name: String,
    pub base_class: Option<String>,
    pub field_names: Vec<String>,
    pub methods: Vec<MethodImage>,
    pub inner_classes: Vec<ClassImage>,
    pub constants: Vec<(String, serde_json::Value)>,
}

/// The whole compiled unit: the script's own synthetic class plus every
/// class declared in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub script_class: ClassImage,
}

pub fn save(unit: &CompiledUnit, path: impl AsRef<Path>) -> Result<(), BytecodeError> {
    let ir_bytes = bincode::serialize(unit).map_err(|e| BytecodeError::Serialize(e.to_string()))?;
    let mut file = File::create(path)?;
    file.write_all(MAGIC)?;
    file.write_all(&VERSION.to_le_bytes())?;
    file.write_all(&(ir_bytes.len() as u32).to_le_bytes())?;
    file.write_all(&ir_bytes)?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<CompiledUnit, BytecodeError> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 12];
    file.read_exact(&mut header)?;
    if &header[0..4] != MAGIC {
        return Err(BytecodeError::InvalidMagic);
    }
    let version = u32::from_le_bytes(header[4..8].try_into().unwrap());
    if version != VERSION {
        return Err(BytecodeError::UnsupportedVersion(version));
    }
    let len = u32::from_le_bytes(header[8..12].try_into().unwrap()) as usize;
    let mut ir_bytes = vec![0u8; len];
    file.read_exact(&mut ir_bytes)?;
    bincode::deserialize(&ir_bytes).map_err(|e| BytecodeError::Deserialize(e.to_string()))
}

/// Checkpoint/restore wire shape . Unlike the on-disk class
/// image, this is the per-instance runtime payload the class emitter's
/// `checkpoint`/`restore` methods produce; it is expressed here as a pure
/// data shape for testing the emitter's expectations against, since actually
/// walking live instances is the (external) runtime's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPayload {
    pub instance_type_tag: i32,
    pub internal_class_name: String,
    pub version: u32,
    pub globals: Option<std::collections::BTreeMap<String, serde_json::Value>>,
    pub parent: Option<Box<CheckpointPayload>>,
    pub fields: Vec<(String, serde_json::Value)>,
}

pub const CHECKPOINT_VERSION: u32 = 1;

pub fn verify_checkpoint_version(found: u32) -> Result<(), crate::error::RuntimeError> {
    if found != CHECKPOINT_VERSION {
        return Err(crate::error::RuntimeError {
            kind: crate::error::RuntimeErrorKind::BadCheckpointVersion { expected: CHECKPOINT_VERSION, found },
            source: String::new(),
            offset: 0,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_version_mismatch_is_rejected() {
        assert!(verify_checkpoint_version(CHECKPOINT_VERSION).is_ok());
        assert!(verify_checkpoint_version(CHECKPOINT_VERSION + 1).is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let unit = CompiledUnit {
            script_class: ClassImage {
                internal_name: "Script".into(),
                base_class: None,
                field_names: vec![],
                methods: vec![MethodImage {
                    name: "main".into(),
                    descriptor: "()V".into(),
                    is_static: true,
                    is_async: false,
                    max_locals: 0,
                    code: vec![Instr::PushInt(7), Instr::Return],
                }],
                inner_classes: vec![],
                constants: vec![],
            },
        };
        let dir = std::env::temp_dir().join(format!("jactl-bytecode-test-{}", std::process::id()));
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("script.jacl");
        save(&unit, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.script_class.methods[0].code, unit.script_class.methods[0].code);
        let _ = std::fs::remove_file(&path);
    }
}
