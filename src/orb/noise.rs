//! Трехмерный симплекс-шум
//!
//! Градиентный шум без сида на скошенной симплексной решетке. Хеширование
//! идет полиномом перестановки `(34x² + x) mod 289`, таблица не нужна.
//! Значения примерно в [-1, 1], функция непрерывна.

const F3: f32 = 1.0 / 3.0;
const G3: f32 = 1.0 / 6.0;

#[inline]
fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: f32) -> f32 {
    mod289((x * 34.0 + 1.0) * x)
}

#[inline]
fn taylor_inv_sqrt(r: f32) -> f32 {
    1.792_842_9 - 0.853_734_7 * r
}

#[inline]
fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Градиент для хешированного угла из почти октаэдрического набора
/// 49 направлений.
#[inline]
fn gradient(hash: f32) -> [f32; 3] {
    const N: f32 = 1.0 / 7.0;
    let ns = [2.0 * N, 0.5 * N - 1.0, N];

    let j = hash - 49.0 * (hash * ns[2] * ns[2]).floor();
    let gx_ = (j * ns[2]).floor();
    let gy_ = (j - 7.0 * gx_).floor();

    let gx = gx_ * ns[0] + ns[1];
    let gy = gy_ * ns[0] + ns[1];
    let h = 1.0 - gx.abs() - gy.abs();

    // складываем нижнюю пирамиду на верхнюю
    let sh = if h <= 0.0 { -1.0 } else { 0.0 };
    let sign = |v: f32| v.floor() * 2.0 + 1.0;

    let g = [gx + sign(gx) * sh, gy + sign(gy) * sh, h];
    let norm = taylor_inv_sqrt(dot(g, g));
    [g[0] * norm, g[1] * norm, g[2] * norm]
}

/// Симплекс-шум в точке `v`. Детерминирован: одна точка всегда дает одно
/// значение.
pub fn simplex3(v: [f32; 3]) -> f32 {
    // скос в симплексное пространство и поиск ячейки
    let s = (v[0] + v[1] + v[2]) * F3;
    let i = [
        (v[0] + s).floor(),
        (v[1] + s).floor(),
        (v[2] + s).floor(),
    ];
    let t = (i[0] + i[1] + i[2]) * G3;
    let x0 = [v[0] - i[0] + t, v[1] - i[1] + t, v[2] - i[2] + t];

    // ранжируем смещения, чтобы выбрать углы симплекса
    let mut g = [0.0f32; 3];
    for k in 0..3 {
        g[k] = if x0[k] >= x0[(k + 1) % 3] { 1.0 } else { 0.0 };
    }
    let l = [1.0 - g[0], 1.0 - g[1], 1.0 - g[2]];
    let mut i1 = [0.0f32; 3];
    let mut i2 = [0.0f32; 3];
    for k in 0..3 {
        let other = l[(k + 2) % 3];
        i1[k] = g[k].min(other);
        i2[k] = g[k].max(other);
    }

    let offsets = [[0.0, 0.0, 0.0], i1, i2, [1.0, 1.0, 1.0]];
    let corner_x = [
        x0,
        [x0[0] - i1[0] + G3, x0[1] - i1[1] + G3, x0[2] - i1[2] + G3],
        [x0[0] - i2[0] + F3, x0[1] - i2[1] + F3, x0[2] - i2[2] + F3],
        [x0[0] - 0.5, x0[1] - 0.5, x0[2] - 0.5],
    ];

    let cell = [mod289(i[0]), mod289(i[1]), mod289(i[2])];

    let mut total = 0.0;
    for (offset, x) in offsets.iter().zip(corner_x.iter()) {
        let m = (0.6 - dot(*x, *x)).max(0.0);
        if m == 0.0 {
            continue;
        }
        let hash = permute(
            permute(permute(cell[2] + offset[2]) + cell[1] + offset[1]) + cell[0] + offset[0],
        );
        let grad = gradient(hash);
        let m2 = m * m;
        total += m2 * m2 * dot(grad, *x);
    }

    42.0 * total
}
