use build_matrix::config::BuildMatrix;
use build_matrix::infra::command::render_command;
use build_matrix::planner::{cartesian_product, plan_execution};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::path::Path;

fn wide_matrix() -> BuildMatrix {
    let mut toml = String::from(
        "tool = \"conda-build\"\n\
         command = \"conda build recipe --output-folder {output_dir}\"\n\
         variant_arg = \"--variant {axis}={value}\"\n\n\
         [[exclude]]\naxis0 = \"v0\"\naxis1 = \"v1\"\n",
    );
    for axis in 0..5 {
        let values: Vec<String> = (0..6).map(|v| format!("\"v{}\"", v)).collect();
        toml.push_str(&format!(
            "\n[[axes]]\nname = \"axis{}\"\nvalues = [{}]\n",
            axis,
            values.join(", ")
        ));
    }
    BuildMatrix::from_toml_str(&toml).unwrap()
}

fn bench_planner(c: &mut Criterion) {
    let matrix = wide_matrix();
    let work_dir = Path::new("/work");

    c.bench_function("cartesian_product_6^5", |b| {
        b.iter(|| cartesian_product(black_box(&matrix.axes)))
    });

    c.bench_function("plan_execution_6^5", |b| {
        b.iter(|| plan_execution(black_box(&matrix), work_dir, None, None).unwrap())
    });

    let plan = plan_execution(&matrix, work_dir, None, None).unwrap();
    c.bench_function("render_command_all", |b| {
        b.iter(|| {
            for build in &plan.builds {
                black_box(
                    render_command(
                        &matrix.command,
                        matrix.variant_arg.as_deref(),
                        &build.combination,
                        &build.output_dir,
                    )
                    .unwrap(),
                );
            }
        })
    });
}

criterion_group!(benches, bench_planner);
criterion_main!(benches);
