// Example: reveal a deeply nested item, then restore expansion across a reload.
use treeflat::{MemorySource, Revealed, TreeList};

fn main() {
    let mut source = MemorySource::with_root("/");
    source.push_top("home");
    source.push_child(Some(&"home"), "user");
    source.push_child(Some(&"user"), "notes.txt");
    source.push_top("etc");
    source.push_child(Some(&"etc"), "hosts");

    let top = source.top_level().to_vec();
    let mut list = TreeList::new(source);
    list.set_items(top).unwrap();

    match list.expand_path_to(&"notes.txt").unwrap() {
        Some(Revealed::Position(p)) => println!("notes.txt is at row {p}"),
        Some(Revealed::Root) => println!("that is the root"),
        None => println!("not reachable"),
    }
    println!("root item: {:?}", list.root_item());

    let state = list.expansion_state();
    list.reload().unwrap();
    println!("after reload: {} rows", list.count());
    list.restore_expansion_state(&state).unwrap();
    println!("after restore: {} rows", list.count());
}
