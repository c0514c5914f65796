use crate::cnn_loop::CnnLoop;
use crate::dump::{StructureDump, TilingDump};
use crate::error::Error;
use crate::layer::ConvLayer;
use crate::structure::Structure;
use crate::types::Stationary;
use crate::variables::Variables;

fn scheduled_loop() -> CnnLoop {
    let layer = ConvLayer::builder().in_w(16).in_h(16).in_c(8).k_w(3).k_h(3).out_c(32).pad_w(1).pad_h(1).build();
    let mut cnn_loop = CnnLoop::from_layer(&layer).unwrap();
    let varset = cnn_loop.variable_set_mut();
    varset.on_mut().out_c = 8;
    varset.on_mut().out_h = 4;
    varset.on_mut().in_h = 6;
    varset.set_parallel(Variables::unit(1, 1, 1));
    cnn_loop.set_off_structure(Structure::preset(Stationary::Input));
    cnn_loop.set_on_structure(Structure::preset(Stationary::Output));
    cnn_loop
}

#[test]
fn test_tiling_dump_layout() {
    let dumped = TilingDump::from_loop(&scheduled_loop()).to_string();
    let lines: Vec<&str> = dumped.lines().collect();
    assert_eq!(lines.len(), 22);
    assert_eq!(lines[9], "Output_height: 4");
    assert_eq!(lines[10], "Output_channel: 8");
    assert_eq!(lines[11], "Stride: 1");
    assert_eq!(lines[21], "Output_channel: 1");
}

#[test]
fn test_tiling_dump_reloads() {
    let cnn_loop = scheduled_loop();
    let dump = TilingDump::from_loop(&cnn_loop);
    let parsed: TilingDump = dump.to_string().parse().unwrap();
    assert_eq!(parsed.on, *cnn_loop.variable_set().on());
    assert_eq!(parsed.parallel, *cnn_loop.variable_set().parallel());
}

#[test]
fn test_structure_dump_reloads_order_only() {
    let cnn_loop = scheduled_loop();
    let dumped = StructureDump::from_loop(&cnn_loop).to_string();
    assert_eq!(dumped.lines().count(), 8);
    let parsed: StructureDump = dumped.parse().unwrap();
    assert_eq!(parsed.off.axes(), cnn_loop.off_structure().axes());
    assert_eq!(parsed.on.axes(), cnn_loop.on_structure().axes());
    assert!(parsed.off.stationary().is_empty());
}

#[test]
fn test_tiling_dump_missing_second_level() {
    let text = Variables::unit(1, 0, 0).to_string();
    assert!(matches!(text.parse::<TilingDump>(), Err(Error::MalformedDump { .. })));
}

#[test]
fn test_structure_dump_trailing_tokens() {
    let mut text = StructureDump::from_loop(&scheduled_loop()).to_string();
    text.push_str("Extra: Kernel_Map\n");
    assert!(matches!(text.parse::<StructureDump>(), Err(Error::MalformedDump { .. })));
}
