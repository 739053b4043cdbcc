//! End-to-end tests: mount an app on the in-memory document and drive it
//! through actions, events and host ticks.

use std::cell::RefCell;
use std::rc::Rc;

use spark_vdom::{
    children, h, mount, Actions, App, Attributes, Done, Error, Map, MemoryTarget,
    MountOptions, Mutation, NodeId, RenderTarget, TaskQueue, Update, VNode, Value, WiredActions,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .with_target(true)
        .try_init();
}

struct Harness {
    target: MemoryTarget,
    body: NodeId,
    queue: TaskQueue,
    app: App,
}

impl Harness {
    fn mount(
        state: Value,
        actions: Actions,
        view: impl Fn(&Value, &WiredActions) -> VNode + 'static,
    ) -> Self {
        init_logging();
        let target = MemoryTarget::new();
        let body = target.create_element("body", false);
        let queue = TaskQueue::new();
        let app = mount(
            state,
            actions,
            view,
            Rc::new(target.clone()),
            body,
            Rc::new(queue.clone()),
            MountOptions::default(),
        )
        .expect("mount");
        queue.run_until_idle();
        Self {
            target,
            body,
            queue,
            app,
        }
    }

    fn markup(&self) -> String {
        self.target.markup(self.body)
    }

    fn call(&self, name: &str, payload: impl Into<Value>) -> Update {
        self.app.actions().call(name, payload).expect("action")
    }
}

// =============================================================================
// Todo list: keyed children under real actions
// =============================================================================

fn todo_state(items: &[&str]) -> Value {
    let list: Vec<Value> = items.iter().map(|s| Value::from(*s)).collect();
    Map::new().with("items", Value::from(list)).into()
}

fn todo_actions() -> Actions {
    Actions::new()
        .action("set", |payload| Ok(Update::merge(Map::new().with("items", payload))))
        .action("rotate", |_| {
            Ok(Update::then(|state, _| {
                let mut items: Vec<Value> = state
                    .get("items")
                    .and_then(Value::as_list)
                    .map(|items| items.to_vec())
                    .unwrap_or_default();
                if !items.is_empty() {
                    items.rotate_right(1);
                }
                Ok(Update::merge(Map::new().with("items", Value::from(items))))
            }))
        })
}

fn todo_view(state: &Value, _: &WiredActions) -> VNode {
    let items: Vec<VNode> = state
        .get("items")
        .and_then(Value::as_list)
        .unwrap_or_default()
        .iter()
        .map(|item| {
            let text = item.to_string();
            h("li", Attributes::new().key(text.as_str()), children![text])
        })
        .collect();
    h("ul", Attributes::new(), children![items])
}

#[test]
fn test_todo_rotation_moves_items() {
    let harness = Harness::mount(todo_state(&["a", "b", "c", "d"]), todo_actions(), todo_view);
    let ul = harness.app.root().unwrap();
    let before = harness.target.child_nodes(ul);
    harness.target.clear_mutations();

    harness.call("rotate", Value::Null);
    harness.queue.run_until_idle();

    let after = harness.target.child_nodes(ul);
    assert_eq!(after, vec![before[3], before[0], before[1], before[2]]);
    assert_eq!(harness.target.text_content(ul), "dabc");
    assert!(!harness
        .target
        .mutations()
        .iter()
        .any(|m| matches!(m, Mutation::CreateElement { .. } | Mutation::Remove { .. })));
}

#[test]
fn test_todo_replace_list() {
    let harness = Harness::mount(todo_state(&["a", "b", "c"]), todo_actions(), todo_view);
    let ul = harness.app.root().unwrap();
    let before = harness.target.child_nodes(ul);

    harness.call("set", Value::from(vec![Value::from("c"), Value::from("x"), Value::from("a")]));
    harness.queue.run_until_idle();

    let after = harness.target.child_nodes(ul);
    assert_eq!(after.len(), 3);
    assert_eq!(after[0], before[2]);
    assert_eq!(after[2], before[0]);
    assert_eq!(harness.target.parent(before[1]), None);
    assert_eq!(harness.markup(), "<body><ul><li>c</li><li>x</li><li>a</li></ul></body>");
}

// =============================================================================
// Namespaces
// =============================================================================

#[test]
fn test_namespaced_counter() {
    let counter = Actions::new().action("up", |_| {
        Ok(Update::then(|state, _| {
            let n = state.get("n").and_then(Value::as_f64).unwrap_or(0.0);
            Ok(Update::merge(Map::new().with("n", n + 1.0)))
        }))
    });
    let harness = Harness::mount(
        Map::new().with("title", "clicks").into(),
        Actions::new().namespace("counter", counter),
        |state, _| {
            let n = state
                .get("counter")
                .and_then(|c| c.get("n"))
                .cloned()
                .unwrap_or(Value::from(0));
            h("p", Attributes::new(), children![format!("{}: {}", state.get("title").cloned().unwrap_or_default(), n)])
        },
    );

    let counter = harness.app.actions().namespace("counter").unwrap();
    counter.call("up", Value::Null).unwrap();
    counter.call("up", Value::Null).unwrap();
    counter.call("up", Value::Null).unwrap();
    assert_eq!(harness.queue.run_until_idle(), 1);

    assert_eq!(harness.markup(), "<body><p>clicks: 3</p></body>");
    assert_eq!(harness.app.passes(), 2);
}

#[test]
fn test_failing_action_skips_render() {
    let actions = Actions::new().action("fail", |_| Err(Error::action("nope")));
    let harness = Harness::mount(Map::new().into(), actions, |_, _| VNode::text("static"));

    let err = harness.app.actions().call("fail", Value::Null).unwrap_err();
    assert_eq!(err.to_string(), "action failed at <root>: nope");
    assert!(harness.queue.is_empty());

    let err = harness.app.actions().call("missing", Value::Null).unwrap_err();
    assert!(matches!(err, Error::UnknownAction { .. }));
}

// =============================================================================
// Forms and lifecycle
// =============================================================================

#[test]
fn test_controlled_input_resets_to_state() {
    let actions = Actions::new().action("touch", |_| {
        Ok(Update::merge(Map::new().with("touched", true)))
    });
    let harness = Harness::mount(Map::new().with("text", "fixed").into(), actions, |state, actions| {
        let actions = actions.clone();
        h(
            "input",
            Attributes::new()
                .with("value", state.get("text").and_then(Value::as_str).unwrap_or_default())
                .on("input", move |_| {
                    let _ = actions.call("touch", Value::Null);
                }),
            children![],
        )
    });
    let input = harness.app.root().unwrap();

    assert!(harness.target.input(input, "typed"));
    assert_eq!(harness.target.property(input, "value"), "typed".into());

    harness.queue.run_until_idle();
    assert_eq!(harness.target.property(input, "value"), "fixed".into());
}

#[test]
fn test_exit_animation_via_onremove() {
    let pending: Rc<RefCell<Vec<Done>>> = Rc::new(RefCell::new(Vec::new()));
    let slot = pending.clone();

    let actions = Actions::new().action("hide", |_| Ok(Update::merge(Map::new().with("shown", false))));
    let harness = Harness::mount(Map::new().with("shown", true).into(), actions, move |state, _| {
        let slot = slot.clone();
        let shown = state.get("shown").and_then(Value::as_bool).unwrap_or(false);
        h(
            "main",
            Attributes::new(),
            children![shown.then(|| h(
                "aside",
                Attributes::new().onremove(move |_, done| slot.borrow_mut().push(done)),
                children!["toast"]
            ))],
        )
    });
    let main = harness.app.root().unwrap();
    let aside = harness.target.child_nodes(main)[0];

    harness.call("hide", Value::Null);
    harness.queue.run_until_idle();

    assert_eq!(harness.target.child_nodes(main), vec![aside]);
    let done = pending.borrow_mut().pop().unwrap();
    done.done();
    assert!(harness.target.child_nodes(main).is_empty());
    assert_eq!(harness.markup(), "<body><main></main></body>");
}

#[test]
fn test_action_from_create_hook_schedules_next_pass() {
    let actions = Actions::new().action("ready", |_| Ok(Update::merge(Map::new().with("ready", true))));
    let harness = Harness::mount(Map::new().with("ready", false).into(), actions, |state, actions| {
        let actions = actions.clone();
        let ready = state.get("ready").and_then(Value::as_bool).unwrap_or(false);
        h(
            "div",
            Attributes::new().oncreate(move |_| {
                let _ = actions.call("ready", Value::Null);
            }),
            children![if ready { "ready" } else { "loading" }],
        )
    });

    // The create hook ran after the first pass and armed a second one
    assert_eq!(harness.app.passes(), 2);
    assert_eq!(harness.markup(), "<body><div>ready</div></body>");
}
