use super::*;

#[test]
fn test_intern_deduplicates_structural_kinds() {
    let mut cache = TirTypeCache::new();
    let a = cache.intern(TirTypeKind::Int {
        signed: true,
        bits: 64,
    });
    let b = cache.intern(TirTypeKind::Int {
        signed: true,
        bits: 64,
    });
    assert_eq!(a, b);
    assert_eq!(cache.len(), 1);

    let c = cache.intern(TirTypeKind::Int {
        signed: false,
        bits: 64,
    });
    assert_ne!(a, c);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_named_types_unique_per_name() {
    let mut cache = TirTypeCache::new();
    let i64_ty = cache.intern(TirTypeKind::Int {
        signed: true,
        bits: 64,
    });
    let first = cache.add_named(
        "string_desc",
        TirTypeKind::Struct {
            fields: vec![TirStructField {
                name: "len".to_string(),
                ty: i64_ty,
            }],
        },
    );
    let second = cache.add_named(
        "string_desc",
        TirTypeKind::Struct {
            fields: Vec::new(),
        },
    );
    assert_eq!(first, second);
    assert_eq!(cache.lookup_named("string_desc"), Some(first));
    assert_eq!(cache.get(first).name.as_deref(), Some("string_desc"));
}

#[test]
fn test_ptr_round_trip() {
    let mut cache = TirTypeCache::new();
    let bool_ty = cache.intern(TirTypeKind::Bool);
    let ptr = cache.ptr_to(bool_ty);
    assert_eq!(cache.pointee(ptr), bool_ty);

    // Pointer types intern structurally too.
    assert_eq!(cache.ptr_to(bool_ty), ptr);
}

#[test]
#[should_panic(expected = "pointee of non-pointer")]
fn test_pointee_of_non_pointer_is_a_bug() {
    let mut cache = TirTypeCache::new();
    let bool_ty = cache.intern(TirTypeKind::Bool);
    let _ = cache.pointee(bool_ty);
}
