use treeflat::{ItemInfo, MemorySource};
use treeflat_adapter::{Controller, Renderer, Surface};

// Example: drive a stdout "widget" through the controller.
//
// The adapter flow is typically:
// 1) attach the surface (its policies configure the engine)
// 2) forward user actions (click = toggle) to the controller
// 3) redraw whenever `notify_changed` fires, pulling rows through `render_at`
#[derive(Default)]
struct Stdout {
    dirty: bool,
}

impl Surface for Stdout {
    fn notify_changed(&mut self) {
        self.dirty = true;
    }
}

struct Line;

impl Renderer<String> for Line {
    type Visual = String;

    fn render(&self, item: &String, previous: Option<String>, info: ItemInfo) -> String {
        let mut line = previous.unwrap_or_default();
        line.clear();
        line.push_str(&"  ".repeat(info.level));
        line.push_str(if info.is_expanded { "v " } else if info.is_expandable { "> " } else { "  " });
        line.push_str(item);
        line
    }
}

fn redraw(c: &mut Controller<MemorySource<String>, Stdout>, cache: &mut Vec<String>) {
    if !c.surface().is_some_and(|s| s.dirty) {
        return;
    }
    let count = c.projection().count();
    cache.resize(count, String::new());
    for (pos, slot) in cache.iter_mut().enumerate() {
        let previous = std::mem::take(slot);
        *slot = c.render_at(pos, &Line, Some(previous)).unwrap_or_default();
        println!("{slot}");
    }
    println!("--");
    if let Some(s) = c.surface_mut() {
        s.dirty = false;
    }
}

fn main() {
    let mut source = MemorySource::new();
    for (parent, child) in [("fruits", "apple"), ("fruits", "pear"), ("veggies", "leek")] {
        if !source.contains(&parent.to_string()) {
            source.push_top(parent.to_string());
        }
        source.push_child(Some(&parent.to_string()), child.to_string());
    }
    let top = source.top_level().to_vec();

    let mut c = Controller::new(source);
    c.attach(Stdout::default()).unwrap();
    c.set_items(top).unwrap();

    let mut cache = Vec::new();
    redraw(&mut c, &mut cache);

    c.toggle(0).unwrap();
    redraw(&mut c, &mut cache);

    let selected = c.capture_anchor(2).unwrap();
    c.toggle(0).unwrap();
    println!("selection hidden: {:?}", selected.resolve(c.list()));
    println!("revealed at: {:?}", c.reveal_anchor(&selected).unwrap());
    redraw(&mut c, &mut cache);
}
