use super::*;
use crate::path_codec::encode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn segs(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn key(parts: &[&str]) -> String {
    encode(parts)
}

fn file(path: &[&str], headings: &[&str], keywords: &[&str]) -> Doc {
    let mut doc = Doc::new(segs(path), true);
    doc.headings = segs(headings);
    doc.keywords = segs(keywords);
    doc
}

fn dir(path: &[&str], children: Vec<Doc>) -> Doc {
    let mut doc = Doc::new(segs(path), false);
    doc.children = children;
    doc
}

/// `a/` containing `b.md` with one heading and one keyword.
fn scenario_cache() -> DocCache {
    let cache = DocCache::from_docs(&[dir(
        &["a"],
        vec![file(&["a", "b"], &["# Title"], &["Key"])],
    )]);
    cache.validate().expect("valid");
    cache
}

fn child_names(cache: &DocCache, parent_key: &str) -> Vec<String> {
    cache
        .shallow_children(parent_key)
        .expect("children")
        .into_iter()
        .map(|doc| doc.name)
        .collect()
}

#[test]
fn from_docs_indexes_every_node() {
    let cache = scenario_cache();
    assert_eq!(cache.len(), 2);
    let b = cache.get(&key(&["a", "b"])).expect("b");
    assert!(b.is_file());
    assert_eq!(b.headings, vec!["# Title"]);
    assert_eq!(b.keywords, vec!["Key"]);
}

#[test]
fn insert_under_existing_directory_sorts_directories_first() {
    let mut cache = scenario_cache();
    cache
        .insert_doc(Doc::new(segs(&["a", "c"]), false))
        .expect("insert c");
    cache
        .insert_doc(Doc::new(segs(&["a", "c", "d"]), true))
        .expect("insert d");

    for k in [key(&["a"]), key(&["a", "c"]), key(&["a", "c", "d"])] {
        assert!(cache.index().contains(&k), "missing {}", k);
    }
    assert_eq!(child_names(&cache, &key(&["a"])), vec!["c", "b"]);
    cache.validate().expect("valid");
}

#[test]
fn insert_rejects_taken_key() {
    let mut cache = scenario_cache();
    let err = cache
        .insert_doc(Doc::new(segs(&["a", "b"]), true))
        .expect_err("duplicate");
    assert!(matches!(err, AppError::AlreadyExists(_)));
    cache.validate().expect("valid");
}

#[test]
fn insert_without_cached_parent_is_inconsistency() {
    let mut cache = scenario_cache();
    let err = cache
        .insert_doc(Doc::new(segs(&["missing", "x"]), true))
        .expect_err("orphan");
    assert!(matches!(err, AppError::CacheInconsistency(_)));
    assert_eq!(cache.len(), 2);
}

#[test]
fn ensure_directories_inserts_missing_ancestors() {
    let mut cache = scenario_cache();
    let parent = cache
        .ensure_directories(&segs(&["a", "n1", "n2"]))
        .expect("ensure");
    let n2 = cache.index().lookup(&key(&["a", "n1", "n2"])).expect("n2");
    assert_eq!(parent, ParentRef::Node(n2));
    assert!(!cache.get(&key(&["a", "n1"])).expect("n1").is_file());
    cache.validate().expect("valid");

    let err = cache
        .ensure_directories(&segs(&["a", "b", "deeper"]))
        .expect_err("file prefix");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn rename_directory_rekeys_whole_subtree() {
    let mut cache = scenario_cache();
    cache.insert_doc(Doc::new(segs(&["a", "c"]), false)).expect("c");
    cache.insert_doc(Doc::new(segs(&["a", "c", "d"]), true)).expect("d");

    let new_key = cache.rename(&key(&["a"]), "z").expect("rename");
    assert_eq!(new_key, "z");

    assert!(cache
        .index()
        .iter()
        .all(|(k, _)| !k.starts_with('a')), "stale keys remain");
    for k in [key(&["z"]), key(&["z", "c"]), key(&["z", "c", "d"]), key(&["z", "b"])] {
        assert!(cache.index().contains(&k), "missing {}", k);
    }
    let d = cache.get(&key(&["z", "c", "d"])).expect("d");
    assert_eq!(d.path, segs(&["z", "c", "d"]));
    assert_eq!(d.id, doc_id("d", &segs(&["z", "c", "d"])));
    cache.validate().expect("valid");
}

#[test]
fn rename_directory_resorts_files_whose_ids_share_a_prefix() {
    let mut cache = DocCache::from_docs(&[dir(
        &["a"],
        vec![file(&["a", "ab"], &[], &[]), file(&["a", "ab-x"], &[], &[])],
    )]);
    assert_eq!(child_names(&cache, "a"), vec!["ab", "ab-x"]);

    cache.rename("a", "z").expect("rename");
    assert_eq!(child_names(&cache, "z"), vec!["ab-x", "ab"]);
    cache.validate().expect("valid");
}

#[test]
fn rename_outer_directory_resorts_nested_folders() {
    let mut cache = DocCache::from_docs(&[dir(
        &["a"],
        vec![dir(
            &["a", "n"],
            vec![file(&["a", "n", "ab"], &[], &[]), file(&["a", "n", "ab-x"], &[], &[])],
        )],
    )]);
    cache.rename("a", "z").expect("rename");
    assert_eq!(child_names(&cache, &key(&["z", "n"])), vec!["ab-x", "ab"]);
    cache.validate().expect("valid");
}

#[test]
fn rename_file_keeps_metadata_and_resorts_siblings() {
    let mut cache = DocCache::from_docs(&[
        file(&["alpha"], &["# A"], &[]),
        file(&["beta"], &[], &[]),
    ]);
    cache.rename(&key(&["alpha"]), "zeta").expect("rename");
    assert_eq!(child_names(&cache, ""), vec!["beta", "zeta"]);
    assert_eq!(cache.get("zeta").expect("zeta").headings, vec!["# A"]);
    cache.validate().expect("valid");
}

#[test]
fn rename_to_sibling_name_is_rejected() {
    let mut cache = DocCache::from_docs(&[file(&["a"], &[], &[]), file(&["b"], &[], &[])]);
    let err = cache.rename("a", "b").expect_err("collision");
    assert!(matches!(err, AppError::AlreadyExists(_)));
    cache.validate().expect("valid");
}

#[test]
fn remove_cascades_to_descendants() {
    let mut cache = scenario_cache();
    cache.insert_doc(Doc::new(segs(&["a", "c"]), false)).expect("c");
    cache.insert_doc(Doc::new(segs(&["a", "c", "d"]), true)).expect("d");

    let removed = cache.remove(&key(&["a", "c"])).expect("remove");
    assert_eq!(removed, 2);
    assert!(!cache.index().contains(&key(&["a", "c"])));
    assert!(!cache.index().contains(&key(&["a", "c", "d"])));
    assert_eq!(child_names(&cache, "a"), vec!["b"]);
    assert_eq!(cache.tree().len(), 2);
    cache.validate().expect("valid");
}

#[test]
fn remove_of_unknown_key_is_inconsistency() {
    let mut cache = scenario_cache();
    let err = cache.remove("nope").expect_err("unknown");
    assert!(matches!(err, AppError::CacheInconsistency(_)));
}

#[test]
fn copy_creates_independent_node() {
    let mut cache = scenario_cache();
    cache.insert_doc(Doc::new(segs(&["x"]), false)).expect("x");

    let copy = cache
        .move_or_copy(&key(&["a", "b"]), &segs(&["x", "b"]), true)
        .expect("copy");
    let source = cache.index().lookup(&key(&["a", "b"])).expect("source");
    assert_ne!(copy, source);

    let copied = cache.get(&key(&["x", "b"])).expect("copy");
    assert_eq!(copied.headings, vec!["# Title"]);
    assert_eq!(copied.path, segs(&["x", "b"]));

    cache
        .update_metadata(&key(&["a", "b"]), DocMetadata::default())
        .expect("update");
    assert_eq!(cache.get(&key(&["x", "b"])).expect("copy").headings, vec!["# Title"]);
    cache.validate().expect("valid");
}

#[test]
fn cut_moves_directory_subtree() {
    let mut cache = scenario_cache();
    cache.insert_doc(Doc::new(segs(&["x"]), false)).expect("x");

    cache
        .move_or_copy("a", &segs(&["x", "moved"]), false)
        .expect("cut");
    assert!(!cache.index().contains("a"));
    assert!(!cache.index().contains(&key(&["a", "b"])));
    let b = cache.get(&key(&["x", "moved", "b"])).expect("b");
    assert_eq!(b.path, segs(&["x", "moved", "b"]));
    assert_eq!(cache.get(&key(&["x", "moved"])).expect("moved").name, "moved");
    cache.validate().expect("valid");
}

#[test]
fn normalized_map_links_parents_and_children() {
    let cache = scenario_cache();
    let map = cache.normalized();
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"].parent_key, None);
    assert_eq!(map["a"].children_keys, vec![key(&["a", "b"])]);
    assert_eq!(map[&key(&["a", "b"])].parent_key.as_deref(), Some("a"));
}

#[test]
fn shallow_children_rejects_files_and_unknown_keys() {
    let cache = scenario_cache();
    assert!(matches!(
        cache.shallow_children(&key(&["a", "b"])),
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(cache.shallow_children("zzz"), Err(AppError::NotFound)));
    assert!(cache.shallow_children("a").expect("a")[0].children.is_empty());
}

#[test]
fn validate_detects_stale_id() {
    let mut cache = scenario_cache();
    let b = cache.index().lookup(&key(&["a", "b"])).expect("b");
    cache.tree.get_mut(b).expect("b").id = "wrong".to_string();
    assert!(matches!(cache.validate(), Err(AppError::CacheInconsistency(_))));
}

#[test]
fn random_operation_sequences_keep_cache_consistent() {
    const NAMES: &[&str] = &["a", "b", "c", "Doc", "e f", "g%h", "ab", "ab-x", "z"];
    let mut rng = StdRng::seed_from_u64(0x6d64_6f63);
    let mut cache = DocCache::empty();

    for step in 0..400 {
        let keys: Vec<String> = cache.index().iter().map(|(k, _)| k.clone()).collect();
        let dirs: Vec<Vec<String>> = cache
            .index()
            .iter()
            .filter_map(|(_, entry)| cache.tree().get(entry.node))
            .filter(|node| node.is_dir)
            .map(|node| node.path.clone())
            .collect();
        let name = NAMES[rng.gen_range(0..NAMES.len())].to_string();
        let parent = if dirs.is_empty() || rng.gen_bool(0.3) {
            Vec::new()
        } else {
            dirs[rng.gen_range(0..dirs.len())].clone()
        };
        let mut target = parent.clone();
        target.push(name.clone());

        match rng.gen_range(0..5) {
            0 | 1 => {
                let _ = cache.insert_doc(Doc::new(target, rng.gen_bool(0.5)));
            }
            2 if !keys.is_empty() => {
                let victim = &keys[rng.gen_range(0..keys.len())];
                cache.remove(victim).expect("remove indexed key");
            }
            3 if !keys.is_empty() => {
                let victim = &keys[rng.gen_range(0..keys.len())];
                let _ = cache.rename(victim, &name);
            }
            4 if !keys.is_empty() => {
                let source = keys[rng.gen_range(0..keys.len())].clone();
                let source_path = cache.get(&source).expect("source").path.clone();
                // Skip moves into the source's own subtree.
                if target.starts_with(&source_path) {
                    continue;
                }
                let _ = cache.move_or_copy(&source, &target, rng.gen_bool(0.5));
            }
            _ => {}
        }

        if let Err(err) = cache.validate() {
            panic!("step {}: {}", step, err);
        }
    }
}
