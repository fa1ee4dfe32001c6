use std::collections::HashMap;

use crate::tir::types::{TirTypeId, TirTypeInfo, TirTypeKind};

/// Layout information for a TIR type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TirLayout {
    size: u64,
    align: u64,
    field_offsets: Vec<u64>,
    stride: u64,
}

impl TirLayout {
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn align(&self) -> u64 {
        self.align
    }

    pub fn field_offsets(&self) -> &[u64] {
        &self.field_offsets
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }
}

fn align_to(value: u64, align: u64) -> u64 {
    debug_assert!(align != 0);
    (value + align - 1) & !(align - 1)
}

/// Caches computed layouts for TIR types.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TirLayoutCache {
    layouts: HashMap<TirTypeId, TirLayout>,
}

impl TirLayoutCache {
    pub fn new() -> Self {
        Self {
            layouts: HashMap::new(),
        }
    }

    /// Returns the cached layout or computes it on demand.
    pub fn layout(&mut self, types: &[TirTypeInfo], ty: TirTypeId) -> TirLayout {
        if let Some(layout) = self.layouts.get(&ty) {
            return layout.clone();
        }

        let layout = self.compute_layout(types, ty);
        self.layouts.insert(ty, layout.clone());
        layout
    }

    fn compute_layout(&mut self, types: &[TirTypeInfo], ty: TirTypeId) -> TirLayout {
        match &types[ty.index()].kind {
            TirTypeKind::Void => TirLayout {
                size: 0,
                align: 1,
                field_offsets: Vec::new(),
                stride: 0,
            },
            TirTypeKind::Bool => TirLayout {
                size: 1,
                align: 1,
                field_offsets: Vec::new(),
                stride: 1,
            },
            TirTypeKind::Int { bits, .. } | TirTypeKind::Float { bits } => {
                let size = (*bits as u64) / 8;
                TirLayout {
                    size,
                    align: size.max(1),
                    field_offsets: Vec::new(),
                    stride: size,
                }
            }
            TirTypeKind::Ptr { .. } | TirTypeKind::Fn { .. } => TirLayout {
                size: 8,
                align: 8,
                field_offsets: Vec::new(),
                stride: 8,
            },
            TirTypeKind::Array { elem, dims } => {
                let elem_layout = self.layout(types, *elem);
                let stride = align_to(elem_layout.size, elem_layout.align);
                let count = dims.iter().product::<u64>();
                TirLayout {
                    size: stride.saturating_mul(count),
                    align: elem_layout.align,
                    field_offsets: Vec::new(),
                    stride,
                }
            }
            TirTypeKind::Vector { elem, lanes } => {
                let elem_layout = self.layout(types, *elem);
                let size = elem_layout.size.saturating_mul(*lanes);
                // Vectors align to their full size, capped at 16 bytes.
                let align = size.next_power_of_two().min(16).max(1);
                TirLayout {
                    size,
                    align,
                    field_offsets: Vec::new(),
                    stride: size,
                }
            }
            TirTypeKind::Struct { fields } => {
                self.layout_fields(types, fields.iter().map(|field| field.ty))
            }
        }
    }

    fn layout_fields(
        &mut self,
        types: &[TirTypeInfo],
        fields: impl Iterator<Item = TirTypeId>,
    ) -> TirLayout {
        let mut offsets = Vec::new();
        let mut offset = 0u64;
        let mut max_align = 1u64;

        for field_ty in fields {
            let field_layout = self.layout(types, field_ty);
            offset = align_to(offset, field_layout.align);
            offsets.push(offset);
            offset += field_layout.size;
            max_align = max_align.max(field_layout.align);
        }

        let size = align_to(offset, max_align);
        TirLayout {
            size,
            align: max_align,
            field_offsets: offsets,
            stride: size,
        }
    }
}

#[cfg(test)]
#[path = "../tests/t_layout.rs"]
mod tests;
