// Plot round-trip MSE of affine quantization
use affine_quant::{QuantConfig, QuantizedArray, Tensor};

use plotters::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // As bit width increases
    let mse = mse_as_bit_width_increases(12)?;
    dbg!(&mse);
    let log_mse: Vec<(f64, f64)> = mse
        .iter()
        .map(|&(x, y)| (x, y.max(f64::MIN_POSITIVE).log10()))
        .collect();
    draw_series(
        "mse-bit-width.png",
        "log10(MSE) vs. Bit Width",
        "Bit Width",
        "log10 Mean Squared Error",
        &log_mse,
    )?;

    // As range increases
    let mse = mse_as_range_increases(10)?;
    draw_series(
        "mse-range.png",
        "MSE vs. Value Range",
        "Value Range",
        "Mean Squared Error (MSE)",
        &mse,
    )?;

    Ok(())
}

fn draw_series(
    path: &str,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(f64, f64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_min, x_max) = (
        points.first().map(|(x, _)| *x).unwrap_or(1.0),
        points.last().map(|(x, _)| *x).unwrap_or(100.0),
    );
    let y_lo = points.iter().map(|(_, y)| *y).fold(0.0, f64::min);
    let y_hi = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    // 10% padding
    let pad = (y_hi - y_lo).abs().max(f64::EPSILON) * 0.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 40).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(75)
        .build_cartesian_2d(x_min..x_max, (y_lo - pad)..(y_hi + pad))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .light_line_style(&WHITE.mix(0.8))
        .draw()?;

    chart
        .draw_series(LineSeries::new(points.iter().cloned(), &RED))?
        .label("MSE Trend")
        .legend(|(x, y)| PathElement::new(vec![(x - 5, y), (x + 5, y)], &RED));

    chart.draw_series(
        points
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 3, RED.filled())),
    )?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn mean_round_trip_mse(
    config: QuantConfig,
    range_magnitude: f64,
    iterations: usize,
    size: usize,
) -> Result<f64, Box<dyn std::error::Error>> {
    let mut sum = 0.0;
    for _ in 0..iterations {
        let original = Tensor::random(vec![size, size], -range_magnitude..range_magnitude);
        let array = QuantizedArray::from_real(config, original.clone())?;
        sum += array.round_trip_error(&original)?.mse;
    }
    Ok(sum / iterations as f64)
}

fn mse_as_bit_width_increases(
    max_bit_width: u32,
) -> Result<Vec<(f64, f64)>, Box<dyn std::error::Error>> {
    assert!(max_bit_width >= 1);

    let mut mses = Vec::new();
    for bit_width in 1..=max_bit_width {
        let mse = mean_round_trip_mse(QuantConfig::new(bit_width, true), 1.0, 100, 10)?;
        mses.push((bit_width as f64, mse));
    }
    Ok(mses)
}

fn mse_as_range_increases(
    max_real_value: i32,
) -> Result<Vec<(f64, f64)>, Box<dyn std::error::Error>> {
    assert!(max_real_value >= 1);

    let mut mses = Vec::new();
    for range_magnitude in 1..=max_real_value {
        let range_magnitude = range_magnitude as f64;
        let mse = mean_round_trip_mse(QuantConfig::new(4, false), range_magnitude, 100, 10)?;
        mses.push((range_magnitude, mse));
    }
    Ok(mses)
}
