use criterion::{black_box, criterion_group, criterion_main, Criterion};
use etlgraph_core::{Node, NodeKind};
use etlgraph_index::{HierarchicalIndex, SearchMode};

fn synthetic_nodes(count: usize) -> Vec<Node> {
    let kinds = [
        NodeKind::Pipeline,
        NodeKind::Operation,
        NodeKind::Table,
        NodeKind::Connection,
        NodeKind::DataAsset,
    ];
    (0..count)
        .map(|i| {
            let kind = kinds[i % kinds.len()];
            Node::new(format!("{}:{i}", kind.as_str()), kind, format!("Node_{i}_Customer_Load"))
                .with_property("sql_query", format!("SELECT * FROM customers_{i}"))
                .with_property("description", "cross package dependency data flow")
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let nodes = synthetic_nodes(3000);
    let index = HierarchicalIndex::build(&nodes);

    c.bench_function("search_all_3000_nodes", |b| {
        b.iter(|| index.search(black_box("customer load"), SearchMode::All, black_box(10)))
    });

    c.bench_function("build_index_3000_nodes", |b| {
        b.iter(|| HierarchicalIndex::build(black_box(&nodes)))
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
