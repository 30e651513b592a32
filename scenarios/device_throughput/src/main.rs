use adb_bench_device_runner::prelude::*;

fn main() -> anyhow::Result<()> {
    if let Err(message) = check_build_env(&program_name()) {
        println!("{message}");
        return Ok(());
    }

    let builder =
        BenchmarkDefinitionBuilder::<DeviceRunnerContext>::new_with_init(env!("CARGO_PKG_NAME"))
            .with_default_runs(10)
            .with_default_size_mib(100)
            .use_setup(connect_device)
            .add_scenario(
                TransferScenario::new("sink", "write RAM", sink)
                    .use_setup(create_local_zero_file)
                    .use_teardown(remove_local_file),
            )
            .add_scenario(TransferScenario::new("source", "read RAM", source))
            .add_scenario(
                TransferScenario::new("push", "write flash", push)
                    .use_setup(create_local_zero_file)
                    .use_teardown(remove_push_files),
            )
            .add_scenario(
                TransferScenario::new("pull", "read flash", pull)
                    .use_setup(create_remote_pull_file)
                    .use_teardown(remove_pull_files),
            )
            // dd writes to stdout, the data crosses the transport like the other transfers.
            .add_scenario(TransferScenario::new("dd", "write flash", dd));

    run(builder)?;

    Ok(())
}
