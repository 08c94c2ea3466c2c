use folio_core::error::Error;
use folio_core::traits::VectorIndex;
use folio_vector::FlatL2Index;

fn index_of(rows: &[[f32; 2]]) -> FlatL2Index {
    let mut index = FlatL2Index::new(2);
    for r in rows { index.add(r).unwrap(); }
    index
}

#[test]
fn search_orders_by_ascending_distance() {
    let index = index_of(&[[5.0, 5.0], [0.0, 1.0], [3.0, 0.0], [0.0, 0.0]]);
    let hits = index.search(&[0.0, 0.0], 4).unwrap();
    let ids: Vec<usize> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![3, 1, 2, 0]);
    // squared L2
    let distances: Vec<f32> = hits.iter().map(|h| h.distance).collect();
    assert_eq!(distances, vec![0.0, 1.0, 9.0, 50.0]);
}

#[test]
fn k_larger_than_index_returns_everything() {
    let index = index_of(&[[1.0, 0.0], [0.0, 1.0]]);
    assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 2);
    assert!(index.search(&[0.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn equal_distances_resolve_to_lower_id() {
    let index = index_of(&[[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]]);
    let ids: Vec<usize> = index.search(&[0.0, 0.0], 3).unwrap().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn ids_follow_insertion_order() {
    let mut index = FlatL2Index::new(3);
    assert_eq!(index.add(&[0.0, 0.0, 1.0]).unwrap(), 0);
    assert_eq!(index.add(&[0.0, 1.0, 0.0]).unwrap(), 1);
    assert_eq!(index.vector(1), Some(&[0.0f32, 1.0, 0.0][..]));
    assert_eq!(index.vector(2), None);
    assert_eq!(index.len(), 2);
}

#[test]
fn dimension_mismatch_is_rejected() {
    let mut index = FlatL2Index::new(2);
    assert!(matches!(index.add(&[1.0, 2.0, 3.0]), Err(Error::DimensionMismatch { expected: 2, actual: 3 })));
    index.add(&[1.0, 2.0]).unwrap();
    assert!(matches!(index.search(&[1.0], 1), Err(Error::DimensionMismatch { .. })));
}

#[test]
fn empty_index_returns_nothing() {
    let index = FlatL2Index::new(4);
    assert!(index.is_empty());
    assert!(index.search(&[0.0; 4], 5).unwrap().is_empty());
}

#[test]
fn persisted_index_answers_like_the_in_memory_one() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("index.bin");
    let index = index_of(&[[0.5, -1.0], [2.0, 2.0], [0.25, 0.0]]);
    index.write_to(&path).unwrap();

    let loaded = FlatL2Index::read_from(&path).unwrap();
    assert_eq!(loaded, index);
    assert_eq!(loaded.search(&[0.0, 0.0], 2).unwrap(), index.search(&[0.0, 0.0], 2).unwrap());
}

#[test]
fn truncated_index_file_is_corrupt() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("index.bin");
    index_of(&[[1.0, 1.0], [2.0, 2.0]]).write_to(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    assert!(matches!(FlatL2Index::read_from(&path), Err(Error::CorruptArtifact { .. })));
}
