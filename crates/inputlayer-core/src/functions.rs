//! Built-in function constructors.
//!
//! Each function builds a [`FuncCall`](crate::ast::FuncCall) expression
//! named identically to the engine builtin; the compiler serializes it as
//! `name(arg1, arg2, …)`. This layer is deliberately thin: it only builds
//! AST nodes.

use crate::ast::{lit, Expr};

// Distance

pub fn euclidean(v1: impl Into<Expr>, v2: impl Into<Expr>) -> Expr {
    Expr::call("euclidean", vec![v1.into(), v2.into()])
}

pub fn cosine(v1: impl Into<Expr>, v2: impl Into<Expr>) -> Expr {
    Expr::call("cosine", vec![v1.into(), v2.into()])
}

pub fn dot(v1: impl Into<Expr>, v2: impl Into<Expr>) -> Expr {
    Expr::call("dot", vec![v1.into(), v2.into()])
}

pub fn manhattan(v1: impl Into<Expr>, v2: impl Into<Expr>) -> Expr {
    Expr::call("manhattan", vec![v1.into(), v2.into()])
}

// Vector operations

pub fn normalize(v: impl Into<Expr>) -> Expr {
    Expr::call("normalize", vec![v.into()])
}

pub fn vec_dim(v: impl Into<Expr>) -> Expr {
    Expr::call("vec_dim", vec![v.into()])
}

pub fn vec_add(v1: impl Into<Expr>, v2: impl Into<Expr>) -> Expr {
    Expr::call("vec_add", vec![v1.into(), v2.into()])
}

pub fn vec_scale(v: impl Into<Expr>, s: impl Into<Expr>) -> Expr {
    Expr::call("vec_scale", vec![v.into(), s.into()])
}

// Locality-sensitive hashing

pub fn lsh_bucket(
    v: impl Into<Expr>,
    table_idx: impl Into<Expr>,
    num_hyperplanes: impl Into<Expr>,
) -> Expr {
    Expr::call(
        "lsh_bucket",
        vec![v.into(), table_idx.into(), num_hyperplanes.into()],
    )
}

pub fn lsh_probes(
    bucket: impl Into<Expr>,
    num_hyperplanes: impl Into<Expr>,
    num_probes: impl Into<Expr>,
) -> Expr {
    Expr::call(
        "lsh_probes",
        vec![bucket.into(), num_hyperplanes.into(), num_probes.into()],
    )
}

pub fn lsh_multi_probe(
    v: impl Into<Expr>,
    table_idx: impl Into<Expr>,
    num_hyperplanes: impl Into<Expr>,
    num_probes: impl Into<Expr>,
) -> Expr {
    Expr::call(
        "lsh_multi_probe",
        vec![
            v.into(),
            table_idx.into(),
            num_hyperplanes.into(),
            num_probes.into(),
        ],
    )
}

// Quantization

pub fn quantize_linear(v: impl Into<Expr>) -> Expr {
    Expr::call("quantize_linear", vec![v.into()])
}

pub fn quantize_symmetric(v: impl Into<Expr>) -> Expr {
    Expr::call("quantize_symmetric", vec![v.into()])
}

pub fn dequantize(v: impl Into<Expr>) -> Expr {
    Expr::call("dequantize", vec![v.into()])
}

pub fn dequantize_scaled(v: impl Into<Expr>, s: impl Into<Expr>) -> Expr {
    Expr::call("dequantize_scaled", vec![v.into(), s.into()])
}

// Int8 distance

pub fn euclidean_int8(v1: impl Into<Expr>, v2: impl Into<Expr>) -> Expr {
    Expr::call("euclidean_int8", vec![v1.into(), v2.into()])
}

pub fn cosine_int8(v1: impl Into<Expr>, v2: impl Into<Expr>) -> Expr {
    Expr::call("cosine_int8", vec![v1.into(), v2.into()])
}

pub fn dot_int8(v1: impl Into<Expr>, v2: impl Into<Expr>) -> Expr {
    Expr::call("dot_int8", vec![v1.into(), v2.into()])
}

pub fn manhattan_int8(v1: impl Into<Expr>, v2: impl Into<Expr>) -> Expr {
    Expr::call("manhattan_int8", vec![v1.into(), v2.into()])
}

// Temporal

pub fn time_now() -> Expr {
    Expr::call("time_now", vec![])
}

pub fn time_diff(t1: impl Into<Expr>, t2: impl Into<Expr>) -> Expr {
    Expr::call("time_diff", vec![t1.into(), t2.into()])
}

pub fn time_add(ts: impl Into<Expr>, duration: impl Into<Expr>) -> Expr {
    Expr::call("time_add", vec![ts.into(), duration.into()])
}

pub fn time_sub(ts: impl Into<Expr>, duration: impl Into<Expr>) -> Expr {
    Expr::call("time_sub", vec![ts.into(), duration.into()])
}

pub fn time_decay(
    ts: impl Into<Expr>,
    now: impl Into<Expr>,
    half_life: impl Into<Expr>,
) -> Expr {
    Expr::call("time_decay", vec![ts.into(), now.into(), half_life.into()])
}

pub fn time_decay_linear(
    ts: impl Into<Expr>,
    now: impl Into<Expr>,
    max_age: impl Into<Expr>,
) -> Expr {
    Expr::call(
        "time_decay_linear",
        vec![ts.into(), now.into(), max_age.into()],
    )
}

pub fn time_before(t1: impl Into<Expr>, t2: impl Into<Expr>) -> Expr {
    Expr::call("time_before", vec![t1.into(), t2.into()])
}

pub fn time_after(t1: impl Into<Expr>, t2: impl Into<Expr>) -> Expr {
    Expr::call("time_after", vec![t1.into(), t2.into()])
}

pub fn time_between(
    ts: impl Into<Expr>,
    start: impl Into<Expr>,
    end: impl Into<Expr>,
) -> Expr {
    Expr::call("time_between", vec![ts.into(), start.into(), end.into()])
}

pub fn within_last(
    ts: impl Into<Expr>,
    now: impl Into<Expr>,
    duration: impl Into<Expr>,
) -> Expr {
    Expr::call("within_last", vec![ts.into(), now.into(), duration.into()])
}

pub fn intervals_overlap(
    s1: impl Into<Expr>,
    e1: impl Into<Expr>,
    s2: impl Into<Expr>,
    e2: impl Into<Expr>,
) -> Expr {
    Expr::call(
        "intervals_overlap",
        vec![s1.into(), e1.into(), s2.into(), e2.into()],
    )
}

pub fn interval_contains(
    s1: impl Into<Expr>,
    e1: impl Into<Expr>,
    s2: impl Into<Expr>,
    e2: impl Into<Expr>,
) -> Expr {
    Expr::call(
        "interval_contains",
        vec![s1.into(), e1.into(), s2.into(), e2.into()],
    )
}

pub fn interval_duration(start: impl Into<Expr>, end: impl Into<Expr>) -> Expr {
    Expr::call("interval_duration", vec![start.into(), end.into()])
}

pub fn point_in_interval(
    ts: impl Into<Expr>,
    start: impl Into<Expr>,
    end: impl Into<Expr>,
) -> Expr {
    Expr::call(
        "point_in_interval",
        vec![ts.into(), start.into(), end.into()],
    )
}

// Math

pub fn abs(x: impl Into<Expr>) -> Expr {
    Expr::call("abs", vec![x.into()])
}

pub fn abs_int64(x: impl Into<Expr>) -> Expr {
    Expr::call("abs_int64", vec![x.into()])
}

pub fn abs_float64(x: impl Into<Expr>) -> Expr {
    Expr::call("abs_float64", vec![x.into()])
}

pub fn sqrt(x: impl Into<Expr>) -> Expr {
    Expr::call("sqrt", vec![x.into()])
}

pub fn pow(base: impl Into<Expr>, exponent: impl Into<Expr>) -> Expr {
    Expr::call("pow", vec![base.into(), exponent.into()])
}

pub fn log(x: impl Into<Expr>) -> Expr {
    Expr::call("log", vec![x.into()])
}

pub fn exp(x: impl Into<Expr>) -> Expr {
    Expr::call("exp", vec![x.into()])
}

pub fn sin(x: impl Into<Expr>) -> Expr {
    Expr::call("sin", vec![x.into()])
}

pub fn cos(x: impl Into<Expr>) -> Expr {
    Expr::call("cos", vec![x.into()])
}

pub fn tan(x: impl Into<Expr>) -> Expr {
    Expr::call("tan", vec![x.into()])
}

pub fn floor(x: impl Into<Expr>) -> Expr {
    Expr::call("floor", vec![x.into()])
}

pub fn ceil(x: impl Into<Expr>) -> Expr {
    Expr::call("ceil", vec![x.into()])
}

pub fn sign(x: impl Into<Expr>) -> Expr {
    Expr::call("sign", vec![x.into()])
}

pub fn min_val(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::call("min_val", vec![a.into(), b.into()])
}

pub fn max_val(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
    Expr::call("max_val", vec![a.into(), b.into()])
}

// Strings

pub fn len(s: impl Into<Expr>) -> Expr {
    Expr::call("len", vec![s.into()])
}

pub fn upper(s: impl Into<Expr>) -> Expr {
    Expr::call("upper", vec![s.into()])
}

pub fn lower(s: impl Into<Expr>) -> Expr {
    Expr::call("lower", vec![s.into()])
}

pub fn trim(s: impl Into<Expr>) -> Expr {
    Expr::call("trim", vec![s.into()])
}

pub fn substr(s: impl Into<Expr>, start: impl Into<Expr>, length: impl Into<Expr>) -> Expr {
    Expr::call("substr", vec![s.into(), start.into(), length.into()])
}

pub fn replace(s: impl Into<Expr>, find: impl Into<Expr>, with: impl Into<Expr>) -> Expr {
    Expr::call("replace", vec![s.into(), find.into(), with.into()])
}

pub fn concat(args: Vec<Expr>) -> Expr {
    Expr::call("concat", args)
}

// Type conversion

pub fn to_float(x: impl Into<Expr>) -> Expr {
    Expr::call("to_float", vec![x.into()])
}

pub fn to_int(x: impl Into<Expr>) -> Expr {
    Expr::call("to_int", vec![x.into()])
}

// Direct index access

/// Direct HNSW nearest-neighbor lookup:
/// `hnsw_nearest("idx", [0.1, 0.2], 10)`, with an optional trailing
/// `ef_search` override.
pub fn hnsw_nearest(
    index_name: &str,
    query_vec: impl Into<Expr>,
    k: i64,
    ef_search: Option<i64>,
) -> Expr {
    let mut args = vec![lit(index_name), query_vec.into(), lit(k)];
    if let Some(ef) = ef_search {
        args.push(lit(ef));
    }
    Expr::call("hnsw_nearest", args)
}
