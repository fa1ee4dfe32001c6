//! Type descriptor builder: maps TAST types onto TIR types.
//!
//! Results are cached by the structural key of the TAST type, so repeated
//! lowering of the same type signature yields the same TIR id. Struct types
//! are registered up front from the module's definitions; single inheritance
//! nests the parent's layout as field 0 of the child.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::diag::Span;
use crate::lower::errors::CodeGenError;
use crate::tast::{Binding, CharLen, Module, PhysicalType, StructDef, Symbol, Ttype};
use crate::tir::{TirStructField, TirTypeCache, TirTypeId, TirTypeKind};

/// Field index of the nested parent layout in a child struct.
pub const PARENT_FIELD: usize = 0;

/// Descriptor field indices.
pub const DESC_DATA: usize = 0;
pub const DESC_OFFSET: usize = 1;
pub const DESC_DIMS: usize = 2;

/// Per-dimension record field indices.
pub const DIM_LOWER: usize = 0;
pub const DIM_SIZE: usize = 1;
pub const DIM_STRIDE: usize = 2;

/// String descriptor field indices.
pub const STR_DATA: usize = 0;
pub const STR_LEN: usize = 1;

/// Class wrapper field indices.
pub const CLASS_HASH: usize = 0;
pub const CLASS_DATA: usize = 1;

/// List container field indices.
pub const LIST_DATA: usize = 0;
pub const LIST_LEN: usize = 1;
pub const LIST_CAP: usize = 2;

#[derive(Debug, Clone)]
pub struct StructLayout {
    pub name: String,
    pub parent: Option<String>,
    /// Own fields only; the inherited header is reached through field 0.
    pub fields: IndexMap<String, (usize, Ttype)>,
    pub bindings: Vec<Binding>,
    pub tir: TirTypeId,
    /// Runtime type identity; small sequential id, not a content hash.
    pub type_hash: u64,
}

#[derive(Debug, Default)]
pub struct TypeLowerer {
    pub cache: TirTypeCache,
    by_key: HashMap<Ttype, TirTypeId>,
    layouts: IndexMap<String, StructLayout>,
    next_hash: u64,
}

impl TypeLowerer {
    pub fn new() -> Self {
        Self {
            cache: TirTypeCache::new(),
            by_key: HashMap::new(),
            layouts: IndexMap::new(),
            next_hash: 1,
        }
    }

    /// Registers every struct definition of the module, parents first.
    pub fn register_structs(&mut self, module: &Module) -> Result<(), CodeGenError> {
        for def in &module.structs {
            self.register_struct(module, def)?;
        }
        Ok(())
    }

    fn register_struct(&mut self, module: &Module, def: &StructDef) -> Result<TirTypeId, CodeGenError> {
        if let Some(layout) = self.layouts.get(&def.name) {
            return Ok(layout.tir);
        }

        let mut tir_fields = Vec::new();
        let mut own_base = 0;
        if let Some(parent) = &def.parent {
            let parent_def =
                module
                    .struct_def(parent)
                    .ok_or_else(|| CodeGenError::UnknownStruct {
                        span: Span::default(),
                        name: parent.clone(),
                    })?;
            let parent_tir = self.register_struct(module, parent_def)?;
            tir_fields.push(TirStructField {
                name: format!("__base_{}", parent),
                ty: parent_tir,
            });
            own_base = 1;
        }

        let mut fields = IndexMap::new();
        for (i, field) in def.fields.iter().enumerate() {
            // Register field struct types first so lowering below finds them.
            if let Ttype::Struct { name } = &field.ty {
                let field_def =
                    module
                        .struct_def(name)
                        .ok_or_else(|| CodeGenError::UnknownStruct {
                            span: Span::default(),
                            name: name.clone(),
                        })?;
                self.register_struct(module, field_def)?;
            }
            let field_tir = self.lower_type(&field.ty);
            tir_fields.push(TirStructField {
                name: field.name.clone(),
                ty: field_tir,
            });
            fields.insert(field.name.clone(), (own_base + i, field.ty.clone()));
        }

        let tir = self
            .cache
            .add_named(def.name.clone(), TirTypeKind::Struct { fields: tir_fields });

        let type_hash = self.next_hash;
        self.next_hash += 1;

        self.layouts.insert(
            def.name.clone(),
            StructLayout {
                name: def.name.clone(),
                parent: def.parent.clone(),
                fields,
                bindings: def.bindings.clone(),
                tir,
                type_hash,
            },
        );
        Ok(tir)
    }

    pub fn layout_of(&self, name: &str) -> Option<&StructLayout> {
        self.layouts.get(name)
    }

    /// Projection path from a struct to one of its (possibly inherited)
    /// fields, descending through nested parent headers.
    pub fn field_path(&self, struct_name: &str, field: &str) -> Option<(Vec<usize>, Ttype)> {
        let layout = self.layouts.get(struct_name)?;
        if let Some((index, ty)) = layout.fields.get(field) {
            return Some((vec![*index], ty.clone()));
        }
        let parent = layout.parent.as_ref()?;
        let (mut path, ty) = self.field_path(parent, field)?;
        path.insert(0, PARENT_FIELD);
        Some((path, ty))
    }

    /// Resolves a type-bound procedure binding, child overrides first.
    pub fn resolve_binding(&self, struct_name: &str, binding: &str) -> Option<&Binding> {
        let layout = self.layouts.get(struct_name)?;
        if let Some(found) = layout.bindings.iter().find(|b| b.name == binding) {
            if !found.deferred {
                return Some(found);
            }
        }
        let parent = layout.parent.as_ref()?;
        self.resolve_binding(parent, binding)
    }

    /// Whether `name` is `base` or (transitively) extends it.
    pub fn extends(&self, name: &str, base: &str) -> bool {
        if name == base {
            return true;
        }
        match self.layouts.get(name).and_then(|l| l.parent.as_ref()) {
            Some(parent) => self.extends(parent, base),
            None => false,
        }
    }

    /// Inheritance closure: every registered concrete type that is an
    /// instance of `base`, in registration order.
    pub fn concrete_types_extending(&self, base: &str) -> Vec<String> {
        self.layouts
            .keys()
            .filter(|name| self.extends(name, base))
            .cloned()
            .collect()
    }

    // --- TAST type -> TIR type ---

    pub fn lower_type(&mut self, ty: &Ttype) -> TirTypeId {
        if let Some(id) = self.by_key.get(ty) {
            return *id;
        }

        let id = match ty {
            Ttype::Integer { bytes } => self.int_ty(bytes * 8),
            Ttype::Real { bytes } => self.float_ty(bytes * 8),
            Ttype::Complex { bytes } => self.complex_ty(bytes * 8),
            Ttype::Logical => self.cache.intern(TirTypeKind::Bool),
            Ttype::Character { .. } => self.string_desc_ty(),
            Ttype::Array {
                elem,
                dims,
                physical,
            } => {
                let elem_tir = self.lower_type(elem);
                match physical {
                    PhysicalType::FixedSize => {
                        let extents = dims
                            .iter()
                            .map(|d| match d.length {
                                Some(n) => n as u64,
                                None => panic!(
                                    "codegen bug: fixed-size array with deferred extent {:?}",
                                    ty
                                ),
                            })
                            .collect();
                        self.cache.intern(TirTypeKind::Array {
                            elem: elem_tir,
                            dims: extents,
                        })
                    }
                    PhysicalType::Descriptor => self.descriptor_ty(elem_tir),
                    PhysicalType::PointerToData => self.cache.ptr_to(elem_tir),
                    PhysicalType::StringArraySinglePointer => {
                        let str_ty = self.string_desc_ty();
                        self.cache.ptr_to(str_ty)
                    }
                    PhysicalType::Simd => {
                        let lanes = dims
                            .iter()
                            .map(|d| d.length.unwrap_or(0) as u64)
                            .product::<u64>();
                        if lanes == 0 {
                            panic!("codegen bug: simd array with deferred extent {:?}", ty);
                        }
                        self.cache.intern(TirTypeKind::Vector {
                            elem: elem_tir,
                            lanes,
                        })
                    }
                }
            }
            Ttype::Struct { name } => match self.layouts.get(name) {
                Some(layout) => layout.tir,
                None => panic!("codegen bug: unregistered struct type '{}'", name),
            },
            Ttype::Class { .. } => self.class_wrapper_ty(),
            Ttype::List { elem } => {
                let elem_tir = self.lower_type(elem);
                let data = self.cache.ptr_to(elem_tir);
                let i64_ty = self.int_ty(64);
                self.cache.add_named(
                    format!("list_t{}", elem_tir.0),
                    TirTypeKind::Struct {
                        fields: vec![
                            TirStructField {
                                name: "data".to_string(),
                                ty: data,
                            },
                            TirStructField {
                                name: "len".to_string(),
                                ty: i64_ty,
                            },
                            TirStructField {
                                name: "cap".to_string(),
                                ty: i64_ty,
                            },
                        ],
                    },
                )
            }
            // Sets and dicts are opaque runtime handles.
            Ttype::Set { .. } | Ttype::Dict { .. } => self.byte_ptr_ty(),
            Ttype::Tuple { elems } => {
                let fields = elems
                    .iter()
                    .enumerate()
                    .map(|(i, elem)| TirStructField {
                        name: format!("f{}", i),
                        ty: self.lower_type(elem),
                    })
                    .collect();
                self.cache.intern(TirTypeKind::Struct { fields })
            }
            Ttype::CPtr => self.byte_ptr_ty(),
        };

        self.by_key.insert(ty.clone(), id);
        id
    }

    /// Storage type of a variable slot: the value representation, behind one
    /// more pointer for by-reference arguments and pointer/allocatable
    /// scalars.
    pub fn storage_ty(&mut self, sym: &Symbol) -> TirTypeId {
        let value_ty = self.lower_type(&sym.ty);
        if sym.extra_indirection() {
            self.cache.ptr_to(value_ty)
        } else {
            value_ty
        }
    }

    pub fn int_ty(&mut self, bits: u8) -> TirTypeId {
        self.cache.intern(TirTypeKind::Int { signed: true, bits })
    }

    pub fn byte_ty(&mut self) -> TirTypeId {
        self.cache.intern(TirTypeKind::Int {
            signed: false,
            bits: 8,
        })
    }

    pub fn byte_ptr_ty(&mut self) -> TirTypeId {
        let byte = self.byte_ty();
        self.cache.ptr_to(byte)
    }

    pub fn float_ty(&mut self, bits: u8) -> TirTypeId {
        self.cache.intern(TirTypeKind::Float { bits })
    }

    pub fn bool_ty(&mut self) -> TirTypeId {
        self.cache.intern(TirTypeKind::Bool)
    }

    pub fn void_ty(&mut self) -> TirTypeId {
        self.cache.intern(TirTypeKind::Void)
    }

    pub fn complex_ty(&mut self, component_bits: u8) -> TirTypeId {
        let float = self.float_ty(component_bits);
        self.cache.add_named(
            format!("complex_{}", component_bits),
            TirTypeKind::Struct {
                fields: vec![
                    TirStructField {
                        name: "re".to_string(),
                        ty: float,
                    },
                    TirStructField {
                        name: "im".to_string(),
                        ty: float,
                    },
                ],
            },
        )
    }

    /// `{ data: ptr<u8>, len: i64 }`
    pub fn string_desc_ty(&mut self) -> TirTypeId {
        let data = self.byte_ptr_ty();
        let len = self.int_ty(64);
        self.cache.add_named(
            "string_desc",
            TirTypeKind::Struct {
                fields: vec![
                    TirStructField {
                        name: "data".to_string(),
                        ty: data,
                    },
                    TirStructField {
                        name: "len".to_string(),
                        ty: len,
                    },
                ],
            },
        )
    }

    /// `{ lower: i64, size: i64, stride: i64 }`
    pub fn dim_ty(&mut self) -> TirTypeId {
        let i64_ty = self.int_ty(64);
        let field = |name: &str| TirStructField {
            name: name.to_string(),
            ty: i64_ty,
        };
        self.cache.add_named(
            "array_dim",
            TirTypeKind::Struct {
                fields: vec![field("lower"), field("size"), field("stride")],
            },
        )
    }

    /// `{ data: ptr<elem>, offset: i64, dims: ptr<array_dim> }`
    pub fn descriptor_ty(&mut self, elem: TirTypeId) -> TirTypeId {
        let data = self.cache.ptr_to(elem);
        let offset = self.int_ty(64);
        let dim_ty = self.dim_ty();
        let dims = self.cache.ptr_to(dim_ty);
        self.cache.add_named(
            format!("desc_t{}", elem.0),
            TirTypeKind::Struct {
                fields: vec![
                    TirStructField {
                        name: "data".to_string(),
                        ty: data,
                    },
                    TirStructField {
                        name: "offset".to_string(),
                        ty: offset,
                    },
                    TirStructField {
                        name: "dims".to_string(),
                        ty: dims,
                    },
                ],
            },
        )
    }

    /// `{ hash: i64, data: ptr<u8> }`; tags a payload, never owns it.
    pub fn class_wrapper_ty(&mut self) -> TirTypeId {
        let hash = self.int_ty(64);
        let data = self.byte_ptr_ty();
        self.cache.add_named(
            "class_wrapper",
            TirTypeKind::Struct {
                fields: vec![
                    TirStructField {
                        name: "hash".to_string(),
                        ty: hash,
                    },
                    TirStructField {
                        name: "data".to_string(),
                        ty: data,
                    },
                ],
            },
        )
    }

    /// `{ hash: i64 }`; compared against a class wrapper's hash, never
    /// called through.
    pub fn vtable_ty(&mut self) -> TirTypeId {
        let hash = self.int_ty(64);
        self.cache.add_named(
            "vtable",
            TirTypeKind::Struct {
                fields: vec![TirStructField {
                    name: "hash".to_string(),
                    ty: hash,
                }],
            },
        )
    }

    /// Byte size of one element of the given TIR type, as stored in arrays.
    pub fn elem_stride(&mut self, elem: TirTypeId) -> u64 {
        self.cache.layout(elem).stride()
    }

    /// Compile-time string length when the type carries one.
    pub fn static_char_len(ty: &Ttype) -> Option<u64> {
        match ty {
            Ttype::Character {
                len: CharLen::Fixed(len),
            } => Some(*len),
            _ => None,
        }
    }

    pub fn take_cache(self) -> TirTypeCache {
        self.cache
    }
}

#[cfg(test)]
#[path = "../tests/t_types.rs"]
mod tests;
