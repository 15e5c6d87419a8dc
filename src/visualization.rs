//! Offset convergence chart rendered from a sim run

use plotters::prelude::*;

use crate::channel::Axis;

pub fn render_convergence_chart(
    history: &[(Axis, Vec<(f64, f64)>)],
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let max_t = history
        .iter()
        .flat_map(|(_, samples)| samples.iter().map(|(t, _)| *t))
        .fold(0.0f64, f64::max);
    let max_offset = history
        .iter()
        .flat_map(|(_, samples)| samples.iter().map(|(_, o)| o.abs()))
        .fold(1.0f64, f64::max);

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Offset convergence", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..max_t.max(1.0), -max_offset..max_offset)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Offset")
        .draw()?;

    for (i, (axis, samples)) in history.iter().enumerate() {
        let color = Palette99::pick(i);
        chart
            .draw_series(LineSeries::new(samples.iter().copied(), &color))?
            .label(axis.to_string())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
