use crate::tir::types::{TirStructField, TirTypeCache, TirTypeKind};

#[test]
fn test_scalar_layouts() {
    let mut cache = TirTypeCache::new();
    let i32_ty = cache.intern(TirTypeKind::Int {
        signed: true,
        bits: 32,
    });
    let layout = cache.layout(i32_ty);
    assert_eq!(layout.size(), 4);
    assert_eq!(layout.align(), 4);

    let bool_ty = cache.intern(TirTypeKind::Bool);
    let layout = cache.layout(bool_ty);
    assert_eq!(layout.size(), 1);
    assert_eq!(layout.align(), 1);

    let f64_ty = cache.intern(TirTypeKind::Float { bits: 64 });
    let ptr_ty = cache.ptr_to(f64_ty);
    let layout = cache.layout(ptr_ty);
    assert_eq!(layout.size(), 8);
    assert_eq!(layout.align(), 8);
}

#[test]
fn test_struct_layout_pads_fields() {
    let mut cache = TirTypeCache::new();
    let bool_ty = cache.intern(TirTypeKind::Bool);
    let i64_ty = cache.intern(TirTypeKind::Int {
        signed: true,
        bits: 64,
    });
    let struct_ty = cache.intern(TirTypeKind::Struct {
        fields: vec![
            TirStructField {
                name: "flag".to_string(),
                ty: bool_ty,
            },
            TirStructField {
                name: "count".to_string(),
                ty: i64_ty,
            },
        ],
    });

    let layout = cache.layout(struct_ty);
    assert_eq!(layout.field_offsets(), &[0, 8]);
    assert_eq!(layout.size(), 16);
    assert_eq!(layout.align(), 8);
}

#[test]
fn test_array_layout_multiplies_extents() {
    let mut cache = TirTypeCache::new();
    let i32_ty = cache.intern(TirTypeKind::Int {
        signed: true,
        bits: 32,
    });
    let arr_ty = cache.intern(TirTypeKind::Array {
        elem: i32_ty,
        dims: vec![3, 4],
    });

    let layout = cache.layout(arr_ty);
    assert_eq!(layout.stride(), 4);
    assert_eq!(layout.size(), 48);
    assert_eq!(layout.align(), 4);
}

#[test]
fn test_vector_layout_aligns_to_size() {
    let mut cache = TirTypeCache::new();
    let f32_ty = cache.intern(TirTypeKind::Float { bits: 32 });
    let vec_ty = cache.intern(TirTypeKind::Vector {
        elem: f32_ty,
        lanes: 4,
    });

    let layout = cache.layout(vec_ty);
    assert_eq!(layout.size(), 16);
    assert_eq!(layout.align(), 16);
}
