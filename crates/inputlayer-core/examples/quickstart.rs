//! Quickstart: compiling typed objects to Datalog.
//!
//! This example builds a small social-network schema and prints every
//! program the compiler emits: schema declarations, fact inserts,
//! queries with joins and filters, aggregations, and a recursive rule.
//!
//! Run with: cargo run --example quickstart -p inputlayer-core

use inputlayer_core::aggregations::{count, top_k};
use inputlayer_core::ast::lit;
use inputlayer_core::compile::{
    compile_bulk_insert, compile_insert, compile_rule, compile_schema, Compiled, Query,
    RuleClause,
};
use inputlayer_core::relation::{Relation, RelationRef};
use inputlayer_derive::Relation;

/// A user of the network.
#[derive(Debug, Clone, Relation)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub followers: i64,
    pub active: bool,
}

/// Who follows whom.
#[derive(Debug, Clone, Relation)]
pub struct Follow {
    pub follower: i64,
    pub followee: i64,
}

fn main() -> inputlayer_core::error::Result<()> {
    // Schema declarations.
    println!("{}", compile_schema(&User::schema()));
    println!("{}", compile_schema(&Follow::schema()));

    // Facts: one persistent insert and a bulk insert.
    let ada = User {
        id: 1,
        name: "Ada".to_string(),
        followers: 120,
        active: true,
    };
    println!("{}", compile_insert(&ada, true));

    let follows = vec![
        Follow {
            follower: 1,
            followee: 2,
        },
        Follow {
            follower: 2,
            followee: 3,
        },
    ];
    println!("{}", compile_bulk_insert(&follows, true));

    // Active users with at least 100 followers, most followed first.
    let query = Query::new()
        .select_relation::<User>()
        .filter(User::active().eq(lit(true)).and(User::followers().ge(lit(100_i64))))
        .order_by(User::followers().desc())
        .limit(10)
        .compile()?;
    for program in query.programs() {
        println!("{program}");
    }

    // Follower counts per followee (grouped head).
    let counts = Query::new()
        .select(Follow::followee())
        .select_agg(count(Follow::follower()))
        .compile()?;
    if let Compiled::Single(program) = counts {
        println!("{program}");
    }

    // Top 5 users by followers, carrying the id through.
    let leaderboard = Query::new()
        .select_agg(top_k(5, vec![User::id().into()], User::followers()))
        .from_relation::<User>()
        .compile()?;
    for program in leaderboard.programs() {
        println!("{program}");
    }

    // An OR filter fans out into one query per branch.
    let either = Query::new()
        .select(User::name())
        .filter(User::id().eq(lit(1_i64)).or(User::id().eq(lit(2_i64))))
        .compile()?;
    for program in either.programs() {
        println!("{program}");
    }

    // Transitive reachability over follows.
    let base = RuleClause::over([RelationRef::from(Follow::schema())]).select([
        ("src", Follow::follower()),
        ("dst", Follow::followee()),
    ]);
    println!(
        "{}",
        compile_rule(
            "reaches",
            &["src".to_string(), "dst".to_string()],
            &base,
            true
        )?
    );

    Ok(())
}
