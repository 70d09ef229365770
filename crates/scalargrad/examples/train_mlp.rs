//! Fit a 3-4-4-1 network to four labelled points with plain gradient descent.

use rand::SeedableRng;
use rand::rngs::StdRng;
use scalargrad::nn::{Mlp, Module, TrainConfig, train};

fn main() -> scalargrad::Result<()> {
    let xs = vec![
        vec![2.0, 3.0, -1.0],
        vec![3.0, -1.0, 0.5],
        vec![0.5, 1.0, 1.0],
        vec![1.0, 1.0, -1.0],
    ];
    let ys = [1.0, -1.0, -1.0, 1.0];

    let mut rng = StdRng::seed_from_u64(42);
    let model = Mlp::new(3, &[4, 4, 1], &mut rng);
    println!("parameters: {}", model.parameters().len());

    let config = TrainConfig {
        learning_rate: 0.1,
        epochs: 50,
    };
    let history = train(&model, &xs, &ys, &config)?;
    for (epoch, loss) in history.iter().enumerate() {
        println!("epoch {epoch:>3}  loss {loss:.6}");
    }

    for (x, target) in xs.iter().zip(ys) {
        let prediction = model.forward_values(x)?;
        println!("{x:?} -> {:+.4} (target {target:+.1})", prediction[0].value());
    }

    Ok(())
}
