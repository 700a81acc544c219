use pomofocus_core::Achievement;
use serde_json::json;

use super::{print_json, CmdResult, Context};

pub fn run(ctx: &Context) -> CmdResult {
    let app = ctx.open();
    let list: Vec<_> = Achievement::ALL
        .iter()
        .map(|a| {
            json!({
                "id": a.id(),
                "title": a.title(),
                "description": a.description(),
                "unlocked": app.unlocked_achievements().contains(a),
            })
        })
        .collect();
    print_json(&list)
}
