use bound_rust::{argument, Bindable, Handle, Members, Notifier, ValueType};

#[derive(Default, Bindable)]
pub struct Widget {
    pub visible: bool,
    pub enabled: bool,
}

/// Text field with the usual family of `set_text` overloads.
#[derive(Default, Bindable)]
#[bind(extend = "text_view_members")]
pub struct TextView {
    #[bind(base)]
    pub widget: Widget,
    #[bind(skip)]
    pub text: String,
    /// Number of successful text writes.
    #[bind(skip)]
    pub writes: usize,
    /// Which `set_text` overload ran last.
    #[bind(skip)]
    pub last_overload: &'static str,
    #[bind(notifier)]
    pub changes: Notifier,
}

impl TextView {
    pub fn with_text(text: &str) -> Self {
        TextView {
            text: text.to_string(),
            ..Self::default()
        }
    }

    fn write(&mut self, text: String, overload: &'static str) {
        self.text = text;
        self.writes += 1;
        self.last_overload = overload;
    }
}

fn text_view_members(members: Members<TextView>) -> Members<TextView> {
    members
        .getter("get_text", |v: &TextView| v.text.clone())
        .getter("get_length", |v: &TextView| v.text.len() as i64)
        .method("set_text", &[], |v: &mut TextView, _args| {
            v.write(String::new(), "set_text()");
            Ok(())
        })
        .method("set_text", &[ValueType::Int], |v: &mut TextView, args| {
            let resource: i64 = argument(args, 0)?;
            v.write(format!("@string/{}", resource), "set_text(int)");
            Ok(())
        })
        .method("set_text", &[ValueType::Text], |v: &mut TextView, args| {
            let text: String = argument(args, 0)?;
            v.write(text, "set_text(text)");
            Ok(())
        })
        .method(
            "set_text",
            &[ValueType::Text, ValueType::Int],
            |v: &mut TextView, args| {
                let text: String = argument(args, 0)?;
                v.write(text, "set_text(text, int)");
                Ok(())
            },
        )
}

/// Simulate the user typing: change the text, then notify listeners.
pub fn type_text(view: &Handle, text: &str) {
    let notifier = view
        .write(|v: &mut TextView| {
            v.text = text.to_string();
            v.changes.clone()
        })
        .expect("handle holds a TextView");
    notifier.notify();
}

/// Exposes only a getter; selection happens through `check`.
#[derive(Default, Bindable)]
#[bind(extend = "radio_group_members")]
pub struct RadioGroup {
    #[bind(skip)]
    pub checked: i64,
}

fn radio_group_members(members: Members<RadioGroup>) -> Members<RadioGroup> {
    members
        .getter("get_checked_radio_button_id", |g: &RadioGroup| g.checked)
        .method("check", &[ValueType::Int], |g: &mut RadioGroup, args| {
            g.checked = argument(args, 0)?;
            Ok(())
        })
}

/// A screen that embeds a plain widget.
#[derive(Default, Bindable)]
pub struct Form {
    #[bind(base)]
    pub widget: Widget,
    pub title: String,
}
