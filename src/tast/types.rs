//! TAST types and physical array layouts.

use std::fmt;

/// Physical runtime layout of an array value.
///
/// The static type of every array carries one of these tags; the lowering
/// engine converts values between layouts only along the legal transition
/// set (see [`PhysicalType::convertible_to`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    /// Self-describing header: data pointer, offset, per-dimension records.
    Descriptor,
    /// Inline aggregate of compile-time-known extent.
    FixedSize,
    /// Bare pointer to contiguous elements; dimensions carried out-of-band.
    PointerToData,
    /// Array of variable-length strings behind a single pointer.
    StringArraySinglePointer,
    /// Fixed-size hardware vector for elementwise operations.
    Simd,
}

impl PhysicalType {
    /// Legality table for physical conversions. Identity is always legal.
    /// SIMD only converts to/from fixed-size arrays.
    pub fn convertible_to(self, dst: PhysicalType) -> bool {
        use PhysicalType::*;
        if self == dst {
            return true;
        }
        matches!(
            (self, dst),
            (Descriptor, FixedSize)
                | (FixedSize, Descriptor)
                | (Descriptor, PointerToData)
                | (PointerToData, Descriptor)
                | (FixedSize, PointerToData)
                | (PointerToData, FixedSize)
                | (FixedSize, Simd)
                | (Simd, FixedSize)
                | (StringArraySinglePointer, Descriptor)
                | (Descriptor, StringArraySinglePointer)
                | (StringArraySinglePointer, FixedSize)
                | (FixedSize, StringArraySinglePointer)
                | (StringArraySinglePointer, PointerToData)
                | (PointerToData, StringArraySinglePointer)
        )
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhysicalType::Descriptor => "descriptor",
            PhysicalType::FixedSize => "fixed",
            PhysicalType::PointerToData => "pointer",
            PhysicalType::StringArraySinglePointer => "string-array",
            PhysicalType::Simd => "simd",
        };
        write!(f, "{}", name)
    }
}

/// Character length of a string type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharLen {
    /// Compile-time length.
    Fixed(u64),
    /// Length determined at first store (allocatable strings).
    Deferred,
    /// Length carried by the actual argument.
    Assumed,
}

/// Declared array dimension. Bounds are compile-time when present; deferred
/// bounds (allocatables, assumed-shape arguments) leave both fields empty and
/// are filled at runtime through the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dim {
    pub lower: Option<i64>,
    pub length: Option<i64>,
}

impl Dim {
    pub fn fixed(lower: i64, length: i64) -> Self {
        Self {
            lower: Some(lower),
            length: Some(length),
        }
    }

    pub fn deferred() -> Self {
        Self {
            lower: None,
            length: None,
        }
    }

    pub fn is_static(&self) -> bool {
        self.lower.is_some() && self.length.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ttype {
    /// Signed integer of the given byte width.
    Integer { bytes: u8 },
    Real { bytes: u8 },
    /// Complex number; `bytes` is the width of one component.
    Complex { bytes: u8 },
    Logical,
    Character { len: CharLen },
    Array {
        elem: Box<Ttype>,
        dims: Vec<Dim>,
        physical: PhysicalType,
    },
    /// Concrete record type, resolved by name against the module's structs.
    Struct { name: String },
    /// Polymorphic value: any type extending the named base.
    Class { name: String },
    List { elem: Box<Ttype> },
    Set { elem: Box<Ttype> },
    Dict { key: Box<Ttype>, value: Box<Ttype> },
    Tuple { elems: Vec<Ttype> },
    CPtr,
}

impl Ttype {
    pub fn int(bytes: u8) -> Self {
        Ttype::Integer { bytes }
    }

    pub fn real(bytes: u8) -> Self {
        Ttype::Real { bytes }
    }

    pub fn complex(bytes: u8) -> Self {
        Ttype::Complex { bytes }
    }

    pub fn character(len: u64) -> Self {
        Ttype::Character {
            len: CharLen::Fixed(len),
        }
    }

    pub fn array(elem: Ttype, dims: Vec<Dim>, physical: PhysicalType) -> Self {
        Ttype::Array {
            elem: Box::new(elem),
            dims,
            physical,
        }
    }

    pub fn fixed_array(elem: Ttype, extents: &[i64]) -> Self {
        Ttype::Array {
            elem: Box::new(elem),
            dims: extents.iter().map(|n| Dim::fixed(1, *n)).collect(),
            physical: PhysicalType::FixedSize,
        }
    }

    pub fn deferred_array(elem: Ttype, rank: usize) -> Self {
        Ttype::Array {
            elem: Box::new(elem),
            dims: vec![Dim::deferred(); rank],
            physical: PhysicalType::Descriptor,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Ttype::Array { .. })
    }

    pub fn is_character(&self) -> bool {
        matches!(self, Ttype::Character { .. })
    }

    /// Scalar values fit in a register and are loaded directly; everything
    /// else is manipulated through its address.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Ttype::Integer { .. } | Ttype::Real { .. } | Ttype::Logical | Ttype::CPtr
        )
    }

    pub fn is_aggregate(&self) -> bool {
        !self.is_scalar()
    }

    pub fn physical(&self) -> Option<PhysicalType> {
        match self {
            Ttype::Array { physical, .. } => Some(*physical),
            _ => None,
        }
    }

    pub fn array_rank(&self) -> usize {
        match self {
            Ttype::Array { dims, .. } => dims.len(),
            _ => 0,
        }
    }

    pub fn array_elem(&self) -> &Ttype {
        match self {
            Ttype::Array { elem, .. } => elem,
            other => panic!("codegen bug: array_elem on non-array type {:?}", other),
        }
    }

    pub fn array_dims(&self) -> &[Dim] {
        match self {
            Ttype::Array { dims, .. } => dims,
            other => panic!("codegen bug: array_dims on non-array type {:?}", other),
        }
    }
}

impl fmt::Display for Ttype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttype::Integer { bytes } => write!(f, "integer({})", bytes),
            Ttype::Real { bytes } => write!(f, "real({})", bytes),
            Ttype::Complex { bytes } => write!(f, "complex({})", bytes),
            Ttype::Logical => write!(f, "logical"),
            Ttype::Character { .. } => write!(f, "character"),
            Ttype::Array {
                elem,
                dims,
                physical,
            } => {
                write!(f, "{}[rank {}, {}]", elem, dims.len(), physical)
            }
            Ttype::Struct { name } => write!(f, "type({})", name),
            Ttype::Class { name } => write!(f, "class({})", name),
            Ttype::List { elem } => write!(f, "list[{}]", elem),
            Ttype::Set { elem } => write!(f, "set[{}]", elem),
            Ttype::Dict { key, value } => write!(f, "dict[{}, {}]", key, value),
            Ttype::Tuple { elems } => {
                write!(f, "tuple[")?;
                for (i, t) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, "]")
            }
            Ttype::CPtr => write!(f, "c_ptr"),
        }
    }
}

#[cfg(test)]
#[path = "../tests/t_physical.rs"]
mod tests;
