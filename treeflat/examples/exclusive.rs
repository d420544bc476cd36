// Example: exclusive expansion keeps a single open branch per level (accordion menus).
use treeflat::{MemorySource, NestMode, TreeList, TreeListOptions};

fn rows(list: &TreeList<MemorySource<u32>>) -> Vec<u32> {
    list.entries().map(|e| *e.item).collect()
}

fn main() {
    let mut source = MemorySource::new();
    for section in 1..=3u32 {
        source.push_top(section);
        for entry in 1..=2 {
            source.push_child(Some(&section), section * 10 + entry);
        }
    }

    let top = source.top_level().to_vec();
    let options = TreeListOptions::new()
        .with_toggle_mode(NestMode::Exclusive)
        .with_on_change(Some(|list: &TreeList<MemorySource<u32>>| {
            println!("changed: {} rows", list.count());
        }));
    let mut list = TreeList::with_options(source, options);
    list.set_items(top).unwrap();

    list.toggle(0).unwrap();
    println!("{:?}", rows(&list));

    // Opening section 3 closes section 1.
    let third = list.position_of(&3).unwrap();
    list.toggle(third).unwrap();
    println!("{:?}", rows(&list));
}
