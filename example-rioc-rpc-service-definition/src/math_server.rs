use crate::{MATH_SERVER_ID, Obj, Sub};
use chrono::{DateTime, TimeDelta, Utc};
use rioc::{Context, RemoteError};
use rioc_rpc_service_endpoint::{MethodTable, RemoteComponent};
use std::sync::Arc;
use std::time::Duration;

/// A small arithmetic component exercising every wire shape: primitives,
/// slices, arrays, variadics, nested structs, pointers, time values, the
/// error capability and the context capability.
#[derive(Debug, Default, Clone)]
pub struct MathServer {
    export: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

impl MathServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the exported methods to `methods`.
    pub fn with_export_methods(mut self, methods: &[&str]) -> Self {
        self.export = Some(methods.iter().map(|name| name.to_string()).collect());
        self
    }

    /// Hides `methods` from remote callers.
    pub fn with_exclude_methods(mut self, methods: &[&str]) -> Self {
        self.exclude = Some(methods.iter().map(|name| name.to_string()).collect());
        self
    }

    /// Integer sums wrap on overflow.
    pub fn sum_i(&self, base: i64, add: i64) -> i64 {
        base.wrapping_add(add)
    }

    pub fn sum_s(&self, base: &str, add: &str) -> String {
        format!("{base}{add}")
    }

    pub fn sum_f(&self, base: f64, add: f64) -> f64 {
        base + add
    }

    pub fn and(&self, b1: bool, b2: bool) -> bool {
        b1 && b2
    }

    pub fn sum_slice_i(&self, base: i64, add: &[i64]) -> i64 {
        add.iter().fold(base, |sum, n| sum.wrapping_add(*n))
    }

    pub fn sum_array_i(&self, base: i64, add: [i64; 3]) -> i64 {
        self.sum_slice_i(base, &add)
    }

    pub fn sum_obj(&self, obj1: &Obj, obj2: &Obj) -> Obj {
        Obj {
            int: self.sum_i(obj1.int, obj2.int),
            string: self.sum_s(&obj1.string, &obj2.string),
            subs: vec![Some(Sub {
                float: obj1.sub_total() + obj2.sub_total(),
            })],
        }
    }

    /// A nil object counts as an empty one.
    pub fn sum_obj_ptr(&self, obj1: Option<&Obj>, obj2: Option<&Obj>) -> Option<Obj> {
        let empty = Obj::default();
        Some(self.sum_obj(obj1.unwrap_or(&empty), obj2.unwrap_or(&empty)))
    }

    /// Saturates at `t` when the sum is not representable.
    pub fn add_time(&self, t: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
        TimeDelta::from_std(duration)
            .ok()
            .and_then(|delta| t.checked_add_signed(delta))
            .unwrap_or(t)
    }

    pub fn add_time_ptr(
        &self,
        t: Option<DateTime<Utc>>,
        duration: Option<Duration>,
    ) -> DateTime<Utc> {
        self.add_time(
            t.unwrap_or(DateTime::UNIX_EPOCH),
            duration.unwrap_or_default(),
        )
    }

    pub fn convert_error(&self, msg: &str) -> (String, Result<(), RemoteError>) {
        if msg.is_empty() {
            ("ok".to_string(), Ok(()))
        } else {
            (String::new(), Err(RemoteError::new(msg)))
        }
    }

    pub fn with_context(&self, _ctx: &Context) -> String {
        "ok".to_string()
    }
}

impl RemoteComponent for MathServer {
    fn remote_service_id(&self) -> String {
        MATH_SERVER_ID.to_string()
    }

    fn register_methods(self: Arc<Self>, table: &mut MethodTable) {
        let this = self;

        table
            .method("SumI", {
                let this = this.clone();
                move |(base, add): (i64, i64)| {
                    let sum = this.sum_i(base, add);
                    async move { (sum,) }
                }
            })
            .method("SumS", {
                let this = this.clone();
                move |(base, add): (String, String)| {
                    let sum = this.sum_s(&base, &add);
                    async move { (sum,) }
                }
            })
            .method("SumF", {
                let this = this.clone();
                move |(base, add): (f64, f64)| {
                    let sum = this.sum_f(base, add);
                    async move { (sum,) }
                }
            })
            .method("And", {
                let this = this.clone();
                move |(b1, b2): (bool, bool)| {
                    let and = this.and(b1, b2);
                    async move { (and,) }
                }
            })
            .method("SumSliceI", {
                let this = this.clone();
                move |(base, add): (i64, Vec<i64>)| {
                    let sum = this.sum_slice_i(base, &add);
                    async move { (sum,) }
                }
            })
            .method("SumArrayI", {
                let this = this.clone();
                move |(base, add): (i64, [i64; 3])| {
                    let sum = this.sum_array_i(base, add);
                    async move { (sum,) }
                }
            })
            .variadic_method("SumSliceIV", {
                let this = this.clone();
                move |(base, add): (i64, Vec<i64>)| {
                    let sum = this.sum_slice_i(base, &add);
                    async move { (sum,) }
                }
            })
            .method("SumObj", {
                let this = this.clone();
                move |(obj1, obj2): (Obj, Obj)| {
                    let sum = this.sum_obj(&obj1, &obj2);
                    async move { (sum,) }
                }
            })
            .method("SumObjPtr", {
                let this = this.clone();
                move |(obj1, obj2): (Option<Obj>, Option<Obj>)| {
                    let sum = this.sum_obj_ptr(obj1.as_ref(), obj2.as_ref());
                    async move { (sum,) }
                }
            })
            .method("AddTime", {
                let this = this.clone();
                move |(t, duration): (DateTime<Utc>, Duration)| {
                    let sum = this.add_time(t, duration);
                    async move { (sum,) }
                }
            })
            .method("AddTimePtr", {
                let this = this.clone();
                move |(t, duration): (Option<DateTime<Utc>>, Option<Duration>)| {
                    let sum = this.add_time_ptr(t, duration);
                    async move { (sum,) }
                }
            })
            .method("ConvertError", {
                let this = this.clone();
                move |(msg,): (String,)| {
                    let converted = this.convert_error(&msg);
                    async move { converted }
                }
            })
            .method("WithContext", {
                let this = this.clone();
                move |(ctx,): (Context,)| {
                    let result = this.with_context(&ctx);
                    async move { (result,) }
                }
            });
    }

    fn export_methods(&self) -> Option<Vec<String>> {
        self.export.clone()
    }

    fn exclude_methods(&self) -> Option<Vec<String>> {
        self.exclude.clone()
    }
}
