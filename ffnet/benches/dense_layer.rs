#[macro_use]
extern crate bencher;

use bencher::Bencher;
use ffnet::activation::ActivationFn;
use ffnet::config::TrainingConfig;
use ffnet::net::layer::Layer;
use ffnet::train::Trainer;
use ffnet::util::bench::*;

macro_rules! impl_forward_bench {
    ($name:ident, $ty:ty, $size:expr) => {
        fn $name(bench: &mut Bencher) {
            let (layer, input) = get_dense_layer::<$ty>($size, ActivationFn::Sigmoid).unwrap();
            bench.iter(|| layer.forward(&input).unwrap())
        }
    };
}

macro_rules! impl_backward_bench {
    ($name:ident, $ty:ty, $size:expr) => {
        fn $name(bench: &mut Bencher) {
            let (mut layer, input) = get_dense_layer::<$ty>($size, ActivationFn::Tanh).unwrap();
            let gradient = vec![0.01; $size];
            bench.iter(|| {
                let record = layer.forward(&input).unwrap();
                layer.backward(record, &gradient, 1e-6).unwrap()
            })
        }
    };
}

impl_forward_bench!(forward_f32_lg, f32, SIZE_LG);
impl_forward_bench!(forward_f32_md, f32, SIZE_MD);
impl_forward_bench!(forward_f32_sm, f32, SIZE_SM);
impl_forward_bench!(forward_f64_md, f64, SIZE_MD);
benchmark_group!(forward, forward_f32_lg, forward_f32_md, forward_f32_sm, forward_f64_md);

impl_backward_bench!(backward_f32_lg, f32, SIZE_LG);
impl_backward_bench!(backward_f32_md, f32, SIZE_MD);
impl_backward_bench!(backward_f32_sm, f32, SIZE_SM);
impl_backward_bench!(backward_f64_md, f64, SIZE_MD);
benchmark_group!(backward, backward_f32_lg, backward_f32_md, backward_f32_sm, backward_f64_md);

fn train_epoch_f32(bench: &mut Bencher) {
    let mut net = get_net::<f32>(32, SIZE_SM, 4).unwrap();
    let (inputs, targets) = get_dataset::<f32>(256, 32, 4);
    let inputs: Vec<&[f32]> = inputs.rows().collect();
    let targets: Vec<&[f32]> = targets.rows().collect();
    let config = TrainingConfig::default()
        .with_epochs(1)
        .and_then(|c| c.with_learning_rate(0.01))
        .unwrap()
        .with_verbose(false);
    bench.iter(|| {
        Trainer::with_seed(&mut net, config.clone(), 0)
            .train(&inputs, &targets)
            .unwrap()
    })
}
benchmark_group!(train, train_epoch_f32);

benchmark_main!(forward, backward, train);
