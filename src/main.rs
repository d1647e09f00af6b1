// Main entry point - all the logic lives in lib.rs and shader.wgsl

use pollster::block_on;
use tribounce::run;

fn main() -> anyhow::Result<()> {
    block_on(run())
}
