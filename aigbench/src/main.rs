fn main() -> anyhow::Result<()> {
    aigbench::run()
}
