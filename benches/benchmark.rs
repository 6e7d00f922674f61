use criterion::{Criterion, criterion_group, criterion_main};
use phylomass::newick;
use phylomass::placement::{Pquery, PqueryName, PqueryPlacement, Sample, earth_movers_distance};

/// Builds a caterpillar tree with the given number of leaves, every branch
/// tagged with a dense edge number.
fn caterpillar_newick(leaves: usize) -> String {
    let mut s = String::new();
    let mut tag = 0;
    for i in 0..leaves - 1 {
        s.push('(');
        s.push_str(&format!("L{}:1.0{{{}}},", i, tag));
        tag += 1;
    }
    s.push_str(&format!("L{}:1.0{{{}}}", leaves - 1, tag));
    tag += 1;
    for _ in 0..leaves - 2 {
        s.push_str(&format!("):1.0{{{}}}", tag));
        tag += 1;
    }
    s.push_str(");");
    s
}

fn sample_on(newick_str: &str, pqueries: usize) -> Sample {
    let tree = newick::parse(newick_str).unwrap();
    let edge_count = tree.edge_count() as i64;
    let mut smp = Sample::new(tree);
    for i in 0..pqueries {
        let p = PqueryPlacement {
            edge_num: (i as i64 * 7) % edge_count,
            like_weight_ratio: 1.0,
            ..PqueryPlacement::default()
        };
        let name = format!("q{}", i);
        smp.add_pquery(Pquery::new(vec![p], vec![PqueryName::new(&name, 0.0)])).unwrap();
    }
    smp
}

fn tree_traversal(c: &mut Criterion) {
    let newick_str = caterpillar_newick(1000);
    let tree = newick::parse(&newick_str).unwrap();
    c.bench_function("postorder_1k_leaves", |b| {
        b.iter(|| tree.postorder().count());
    });
}

fn newick_parsing(c: &mut Criterion) {
    let newick_str = caterpillar_newick(1000);
    c.bench_function("parse_1k_leaves", |b| {
        b.iter(|| newick::parse(&newick_str).unwrap());
    });
}

fn mass_measures(c: &mut Criterion) {
    let newick_str = caterpillar_newick(1000);
    let lhs = sample_on(&newick_str, 500);
    let rhs = sample_on(&newick_str, 500);
    c.bench_function("emd_1k_leaves_500_pqueries", |b| {
        b.iter(|| earth_movers_distance(&lhs, &rhs).unwrap());
    });
}

criterion_group!(traversal, tree_traversal);
criterion_group!(parsing, newick_parsing);
criterion_group! {
    name = measures;
    config = Criterion::default().sample_size(20);
    targets = mass_measures
}
criterion_main!(traversal, parsing, measures);
