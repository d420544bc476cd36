// Example: build a tree from an in-memory source, expand/collapse rows and print the flat list.
use treeflat::{MemorySource, NestMode, TreeList};

fn print(list: &TreeList<MemorySource<&'static str>>) {
    for entry in list.entries() {
        let marker = match (entry.info.is_expandable, entry.info.is_expanded) {
            (false, _) => ' ',
            (true, false) => '+',
            (true, true) => '-',
        };
        println!("{}{marker} {}", "  ".repeat(entry.info.level), entry.item);
    }
    println!("({} rows)", list.count());
}

fn main() {
    let mut source = MemorySource::new();
    source.push_top("src");
    source.push_child(Some(&"src"), "lib.rs");
    source.push_child(Some(&"src"), "tree");
    source.push_child(Some(&"tree"), "node.rs");
    source.push_child(Some(&"tree"), "flatten.rs");
    source.push_top("Cargo.toml");

    let top = source.top_level().to_vec();
    let mut list = TreeList::new(source);
    list.set_items(top).unwrap();
    print(&list);

    list.expand(0, NestMode::Concurrent).unwrap();
    let tree = list.position_of(&"tree").unwrap();
    list.toggle(tree).unwrap();
    print(&list);

    list.collapse(0);
    print(&list);
}
