use rioc::remote_struct;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Obj {
    pub int: i64,
    pub string: String,
    pub subs: Vec<Option<Sub>>,
}

remote_struct!(Obj {
    int: i64 => "int",
    string: String => "string",
    subs: Vec<Option<Sub>> => "subs",
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sub {
    pub float: f64,
}

remote_struct!(Sub { float: f64 => "float" });

impl Obj {
    /// Sum of every present sub's float.
    pub fn sub_total(&self) -> f64 {
        self.subs.iter().flatten().map(|sub| sub.float).sum()
    }
}
