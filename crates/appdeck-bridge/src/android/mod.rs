// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android package service via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Every trait method is one round trip into
// `PackageManager`, `LauncherApps` or the hosting `Activity`.
//
// ## Architecture notes
//
// `LauncherApps.Callback` is an abstract Java class, so package-change
// notifications need a small Java subclass shipped by the host app:
// `app.appdeck.launcher.NativeLauncherCallback` (see
// `android/NativeLauncherCallback.java` in this crate). It carries an opaque
// `long` handle and forwards each override to the `Java_…_native*` exports at
// the bottom of this file, which look the handle up in `CALLBACKS`.

#![cfg(target_os = "android")]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use jni::objects::{GlobalRef, JClass, JObject, JObjectArray, JString, JValue};
use jni::sys::{jboolean, jlong};
use jni::{JNIEnv, JavaVM};

use appdeck_core::error::{LauncherError, Result};
use appdeck_core::{
    ActivityInfo, ApplicationInfo, CallbackId, ComponentName, Drawable, Intent, LaunchCategory,
    PackageFlags,
};

use crate::render::{argb_to_rgba, pixel_count};
use crate::traits::{PackageCallback, PackageService};

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Binary name of the host-supplied callback subclass (class-loader form).
const CALLBACK_CLASS: &str = "app.appdeck.launcher.NativeLauncherCallback";

const NAME_NOT_FOUND_EXCEPTION: &str = "android/content/pm/PackageManager$NameNotFoundException";
const ACTIVITY_NOT_FOUND_EXCEPTION: &str = "android/content/ActivityNotFoundException";

/// `ApplicationInfo.FLAG_INSTALLED`.
const FLAG_INSTALLED: i32 = 0x0080_0000;

/// `Context.LAUNCHER_APPS_SERVICE`.
const LAUNCHER_APPS_SERVICE: &str = "launcherapps";

static VM: OnceLock<JavaVM> = OnceLock::new();

/// Obtain the process-wide [`JavaVM`] from the NDK context.
fn java_vm() -> Result<&'static JavaVM> {
    if let Some(vm) = VM.get() {
        return Ok(vm);
    }
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| LauncherError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    Ok(VM.get_or_init(|| vm))
}

/// Obtain a [`JNIEnv`] for the current thread, attaching it if needed.
///
/// Callback threads from the platform dispatcher stay attached for the rest
/// of the process; they are pool threads owned by the framework.
fn jni_env() -> Result<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| LauncherError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// Error carried out of a JNI local frame.
enum FrameError {
    Jni(jni::errors::Error),
    Launcher(LauncherError),
}

impl From<jni::errors::Error> for FrameError {
    fn from(e: jni::errors::Error) -> Self {
        Self::Jni(e)
    }
}

/// Default local-reference capacity for one service call.
const FRAME_CAPACITY: i32 = 32;

/// Run `f` inside a pushed JNI local frame on an attached thread.
///
/// Threads attached with `attach_current_thread_permanently` never return to
/// Java, so every local reference a call creates is released when the frame
/// is popped.
fn with_frame<T>(f: impl FnOnce(&mut JNIEnv<'_>) -> Result<T>) -> Result<T> {
    let mut env = jni_env()?;
    env.with_local_frame(FRAME_CAPACITY, |env| f(env).map_err(FrameError::Launcher))
        .map_err(|e| match e {
            FrameError::Launcher(e) => e,
            FrameError::Jni(e) => LauncherError::Bridge(format!("JNI local frame: {e}")),
        })
}

/// Obtain the hosting Android `Activity` as a [`JObject`].
fn activity() -> Result<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(LauncherError::Bridge(
            "Android context is null; native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Map a failed JNI call into a `LauncherError`.
///
/// A pending Java exception is cleared and classified: `NameNotFoundException`
/// becomes `PackageNotFound`, `ActivityNotFoundException` becomes
/// `ActivityNotFound`, anything else `Bridge`.
fn java_err(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> LauncherError {
    if matches!(e, jni::errors::Error::JavaException) {
        let throwable = env.exception_occurred();
        let _ = env.exception_clear();
        if let Ok(throwable) = throwable {
            if env
                .is_instance_of(&throwable, NAME_NOT_FOUND_EXCEPTION)
                .unwrap_or(false)
            {
                return LauncherError::PackageNotFound(context.into());
            }
            if env
                .is_instance_of(&throwable, ACTIVITY_NOT_FOUND_EXCEPTION)
                .unwrap_or(false)
            {
                return LauncherError::ActivityNotFound(context.into());
            }
        }
    }
    LauncherError::Bridge(format!("{context}: {e}"))
}

/// Call an object-returning method. A `null` result is returned as a null `JObject`.
fn call_object<'a>(
    env: &mut JNIEnv<'a>,
    target: &JObject<'_>,
    name: &str,
    sig: &str,
    args: &[JValue<'_, '_>],
) -> Result<JObject<'a>> {
    let value = env
        .call_method(target, name, sig, args)
        .map_err(|e| java_err(env, name, e))?;
    value.l().map_err(|e| java_err(env, name, e))
}

fn call_int(env: &mut JNIEnv<'_>, target: &JObject<'_>, name: &str, sig: &str) -> Result<i32> {
    let value = env
        .call_method(target, name, sig, &[])
        .map_err(|e| java_err(env, name, e))?;
    value.i().map_err(|e| java_err(env, name, e))
}

fn call_void(
    env: &mut JNIEnv<'_>,
    target: &JObject<'_>,
    name: &str,
    sig: &str,
    args: &[JValue<'_, '_>],
) -> Result<()> {
    env.call_method(target, name, sig, args)
        .map_err(|e| java_err(env, name, e))?;
    Ok(())
}

fn string_field(env: &mut JNIEnv<'_>, target: &JObject<'_>, field: &str) -> Result<Option<String>> {
    let value = env
        .get_field(target, field, "Ljava/lang/String;")
        .map_err(|e| java_err(env, field, e))?
        .l()
        .map_err(|e| java_err(env, field, e))?;
    if value.is_null() {
        return Ok(None);
    }
    to_rust_string(env, value).map(Some)
}

fn to_rust_string(env: &mut JNIEnv<'_>, value: JObject<'_>) -> Result<String> {
    let j_string = JString::from(value);
    let s: String = env
        .get_string(&j_string)
        .map_err(|e| java_err(env, "get_string", e))?
        .into();
    Ok(s)
}

fn new_string<'a>(env: &mut JNIEnv<'a>, value: &str) -> Result<JString<'a>> {
    env.new_string(value)
        .map_err(|e| java_err(env, "new_string", e))
}

/// `activity.getPackageManager()`.
fn package_manager<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JObject<'a>> {
    call_object(
        env,
        activity,
        "getPackageManager",
        "()Landroid/content/pm/PackageManager;",
        &[],
    )
}

/// `activity.getSystemService(LAUNCHER_APPS_SERVICE)`.
fn launcher_apps<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JObject<'a>> {
    let j_name = new_string(env, LAUNCHER_APPS_SERVICE)?;
    let service = call_object(
        env,
        activity,
        "getSystemService",
        "(Ljava/lang/String;)Ljava/lang/Object;",
        &[JValue::Object(&j_name)],
    )?;
    if service.is_null() {
        return Err(LauncherError::Bridge("LauncherApps service unavailable".into()));
    }
    Ok(service)
}

// ---------------------------------------------------------------------------
// Model <-> Java conversion
// ---------------------------------------------------------------------------

/// Build an `android.content.Intent` from the bridge's intent model.
fn to_java_intent<'a>(env: &mut JNIEnv<'a>, intent: &Intent) -> Result<JObject<'a>> {
    let j_action = new_string(env, &intent.action)?;
    let j_intent = env
        .new_object(
            "android/content/Intent",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_action)],
        )
        .map_err(|e| java_err(env, "new Intent", e))?;

    for category in &intent.categories {
        let j_category = new_string(env, category)?;
        call_object(
            env,
            &j_intent,
            "addCategory",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&j_category)],
        )?;
    }

    if let Some(data) = &intent.data {
        let j_scheme = new_string(env, &data.scheme)?;
        let j_ssp = new_string(env, &data.scheme_specific_part)?;
        let uri = env
            .call_static_method(
                "android/net/Uri",
                "fromParts",
                "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)Landroid/net/Uri;",
                &[
                    JValue::Object(&j_scheme),
                    JValue::Object(&j_ssp),
                    JValue::Object(&JObject::null()),
                ],
            )
            .map_err(|e| java_err(env, "Uri.fromParts", e))?
            .l()
            .map_err(|e| java_err(env, "Uri.fromParts", e))?;
        call_object(
            env,
            &j_intent,
            "setData",
            "(Landroid/net/Uri;)Landroid/content/Intent;",
            &[JValue::Object(&uri)],
        )?;
    }

    if let Some(mime_type) = &intent.mime_type {
        let j_mime = new_string(env, mime_type)?;
        call_object(
            env,
            &j_intent,
            "setTypeAndNormalize",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&j_mime)],
        )?;
    }

    if let Some(component) = &intent.component {
        let j_package = new_string(env, &component.package)?;
        let j_class = new_string(env, &component.class)?;
        call_object(
            env,
            &j_intent,
            "setClassName",
            "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&j_package), JValue::Object(&j_class)],
        )?;
    }

    if intent.flags != 0 {
        call_object(
            env,
            &j_intent,
            "setFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(intent.flags)],
        )?;
    }

    Ok(j_intent)
}

/// Read `packageName` and `name` off an `android.content.pm.ActivityInfo`.
fn from_java_activity(env: &mut JNIEnv<'_>, info: &JObject<'_>) -> Result<ActivityInfo> {
    let package_name = string_field(env, info, "packageName")?.unwrap_or_default();
    let name = string_field(env, info, "name")?.unwrap_or_default();
    Ok(ActivityInfo { package_name, name })
}

/// `resolveInfo.activityInfo`, or `None` for a null `ResolveInfo`.
fn activity_of_resolve_info(
    env: &mut JNIEnv<'_>,
    resolve_info: &JObject<'_>,
) -> Result<Option<ActivityInfo>> {
    if resolve_info.is_null() {
        return Ok(None);
    }
    let info = env
        .get_field(resolve_info, "activityInfo", "Landroid/content/pm/ActivityInfo;")
        .map_err(|e| java_err(env, "ResolveInfo.activityInfo", e))?
        .l()
        .map_err(|e| java_err(env, "ResolveInfo.activityInfo", e))?;
    if info.is_null() {
        return Ok(None);
    }
    let activity = from_java_activity(env, &info)?;
    let _ = env.delete_local_ref(info);
    Ok(Some(activity))
}

/// Re-fetch the Java `ActivityInfo` for a component, for label/icon loading.
fn java_activity_info<'a>(
    env: &mut JNIEnv<'a>,
    pm: &JObject<'_>,
    activity: &ActivityInfo,
) -> Result<JObject<'a>> {
    let j_package = new_string(env, &activity.package_name)?;
    let j_class = new_string(env, &activity.name)?;
    let component = env
        .new_object(
            "android/content/ComponentName",
            "(Ljava/lang/String;Ljava/lang/String;)V",
            &[JValue::Object(&j_package), JValue::Object(&j_class)],
        )
        .map_err(|e| java_err(env, "new ComponentName", e))?;
    call_object(
        env,
        pm,
        "getActivityInfo",
        "(Landroid/content/ComponentName;I)Landroid/content/pm/ActivityInfo;",
        &[JValue::Object(&component), JValue::Int(0)],
    )
}

/// Rasterize a `Drawable` at its intrinsic size and read the pixels back.
fn rasterize(env: &mut JNIEnv<'_>, drawable: &JObject<'_>) -> Result<Option<Drawable>> {
    if drawable.is_null() {
        return Ok(None);
    }
    let width = call_int(env, drawable, "getIntrinsicWidth", "()I")?;
    let height = call_int(env, drawable, "getIntrinsicHeight", "()I")?;
    if width <= 0 || height <= 0 {
        return Ok(Some(Drawable {
            width,
            height,
            pixels: Vec::new(),
        }));
    }

    let config = env
        .get_static_field(
            "android/graphics/Bitmap$Config",
            "ARGB_8888",
            "Landroid/graphics/Bitmap$Config;",
        )
        .map_err(|e| java_err(env, "Bitmap.Config.ARGB_8888", e))?
        .l()
        .map_err(|e| java_err(env, "Bitmap.Config.ARGB_8888", e))?;

    let bitmap = env
        .call_static_method(
            "android/graphics/Bitmap",
            "createBitmap",
            "(IILandroid/graphics/Bitmap$Config;)Landroid/graphics/Bitmap;",
            &[JValue::Int(width), JValue::Int(height), JValue::Object(&config)],
        )
        .map_err(|e| java_err(env, "Bitmap.createBitmap", e))?
        .l()
        .map_err(|e| java_err(env, "Bitmap.createBitmap", e))?;

    let canvas = env
        .new_object(
            "android/graphics/Canvas",
            "(Landroid/graphics/Bitmap;)V",
            &[JValue::Object(&bitmap)],
        )
        .map_err(|e| java_err(env, "new Canvas", e))?;

    call_void(
        env,
        drawable,
        "setBounds",
        "(IIII)V",
        &[
            JValue::Int(0),
            JValue::Int(0),
            JValue::Int(width),
            JValue::Int(height),
        ],
    )?;
    call_void(
        env,
        drawable,
        "draw",
        "(Landroid/graphics/Canvas;)V",
        &[JValue::Object(&canvas)],
    )?;

    // bitmap.getPixels(pixels, 0, width, 0, 0, width, height)
    let len = pixel_count(width, height)?;
    let pixels = env
        .new_int_array(len)
        .map_err(|e| java_err(env, "new_int_array", e))?;
    call_void(
        env,
        &bitmap,
        "getPixels",
        "([IIIIIII)V",
        &[
            JValue::Object(&pixels),
            JValue::Int(0),
            JValue::Int(width),
            JValue::Int(0),
            JValue::Int(0),
            JValue::Int(width),
            JValue::Int(height),
        ],
    )?;

    let mut argb = vec![0i32; len as usize];
    env.get_int_array_region(&pixels, 0, &mut argb)
        .map_err(|e| java_err(env, "get_int_array_region", e))?;
    call_void(env, &bitmap, "recycle", "()V", &[])?;

    Ok(Some(Drawable {
        width,
        height,
        pixels: argb_to_rgba(&argb),
    }))
}

// ---------------------------------------------------------------------------
// Callback table
// ---------------------------------------------------------------------------

struct RegisteredCallback {
    /// Keeps the Java subclass alive until it is unregistered.
    java: GlobalRef,
    callback: Arc<dyn PackageCallback>,
}

static NEXT_CALLBACK: AtomicU64 = AtomicU64::new(1);
static CALLBACKS: OnceLock<Mutex<HashMap<u64, RegisteredCallback>>> = OnceLock::new();

fn callbacks() -> MutexGuard<'static, HashMap<u64, RegisteredCallback>> {
    CALLBACKS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .expect("callback table lock poisoned")
}

/// Run `f` on the callback behind a handle, with the table lock released.
fn dispatch(handle: jlong, f: impl FnOnce(&dyn PackageCallback)) {
    let callback = callbacks()
        .get(&(handle as u64))
        .map(|entry| entry.callback.clone());
    match callback {
        Some(callback) => f(callback.as_ref()),
        None => tracing::debug!(handle, "Notification for unregistered callback ignored"),
    }
}

/// Load an application class through the Activity's class loader.
///
/// `FindClass` on a platform-attached thread only sees framework classes.
fn load_app_class<'a>(
    env: &mut JNIEnv<'a>,
    activity: &JObject<'_>,
    binary_name: &str,
) -> Result<JClass<'a>> {
    let loader = call_object(env, activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])?;
    let j_name = new_string(env, binary_name)?;
    let class = call_object(
        env,
        &loader,
        "loadClass",
        "(Ljava/lang/String;)Ljava/lang/Class;",
        &[JValue::Object(&j_name)],
    )?;
    Ok(JClass::from(class))
}

// ---------------------------------------------------------------------------
// Service struct
// ---------------------------------------------------------------------------

/// Android implementation of the package service.
///
/// The struct is zero-sized; platform state lives on the Java side and in
/// the callback table.
pub struct AndroidPackageService;

impl AndroidPackageService {
    /// Create a new Android package service.
    ///
    /// This does **not** touch JNI. The first JNI call happens lazily.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidPackageService {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageService for AndroidPackageService {
    fn package_name(&self) -> Result<String> {
        with_frame(|env| {
            let activity = activity()?;
            let j_pkg = call_object(env, &activity, "getPackageName", "()Ljava/lang/String;", &[])?;
            to_rust_string(env, j_pkg)
        })
    }

    fn sdk_int(&self) -> u32 {
        let sdk = with_frame(|env| {
            env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
                .and_then(|v| v.i())
                .map_err(|e| java_err(env, "Build.VERSION.SDK_INT", e))
        });
        match sdk {
            Ok(sdk) => sdk.max(0) as u32,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read SDK_INT");
                0
            }
        }
    }

    fn query_intent_activities(&self, intent: &Intent) -> Result<Vec<ActivityInfo>> {
        let found = with_frame(|env| {
            let activity = activity()?;
            let pm = package_manager(env, &activity)?;
            let j_intent = to_java_intent(env, intent)?;

            let list = call_object(
                env,
                &pm,
                "queryIntentActivities",
                "(Landroid/content/Intent;I)Ljava/util/List;",
                &[JValue::Object(&j_intent), JValue::Int(0)],
            )?;
            let size = call_int(env, &list, "size", "()I")?;

            let mut found = Vec::with_capacity(size.max(0) as usize);
            for index in 0..size {
                let resolve_info = call_object(
                    env,
                    &list,
                    "get",
                    "(I)Ljava/lang/Object;",
                    &[JValue::Int(index)],
                )?;
                if let Some(info) = activity_of_resolve_info(env, &resolve_info)? {
                    found.push(info);
                }
                let _ = env.delete_local_ref(resolve_info);
            }
            Ok(found)
        })?;

        tracing::debug!(%intent, count = found.len(), "Android: intent activities queried");
        Ok(found)
    }

    fn launch_intent_for_package(
        &self,
        package_name: &str,
        category: LaunchCategory,
    ) -> Result<Option<Intent>> {
        with_frame(|env| {
            let activity = activity()?;
            let pm = package_manager(env, &activity)?;
            let j_package = new_string(env, package_name)?;

            let method = match category {
                LaunchCategory::Leanback => "getLeanbackLaunchIntentForPackage",
                LaunchCategory::Launcher => "getLaunchIntentForPackage",
            };
            let j_intent = call_object(
                env,
                &pm,
                method,
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_package)],
            )?;
            if j_intent.is_null() {
                return Ok(None);
            }

            // The platform intent is started as returned, flags included.
            let flags = call_int(env, &j_intent, "getFlags", "()I")?;
            let mut intent = Intent::launcher_query(category.intent_category()).add_flags(flags);
            let component = call_object(
                env,
                &j_intent,
                "getComponent",
                "()Landroid/content/ComponentName;",
                &[],
            )?;
            if !component.is_null() {
                let j_pkg = call_object(env, &component, "getPackageName", "()Ljava/lang/String;", &[])?;
                let j_cls = call_object(env, &component, "getClassName", "()Ljava/lang/String;", &[])?;
                let package = to_rust_string(env, j_pkg)?;
                let class = to_rust_string(env, j_cls)?;
                intent = intent.set_component(ComponentName::new(package, class));
            }
            Ok(Some(intent))
        })
    }

    fn resolve_activity(&self, intent: &Intent) -> Result<Option<ActivityInfo>> {
        with_frame(|env| {
            let activity = activity()?;
            let pm = package_manager(env, &activity)?;
            let j_intent = to_java_intent(env, intent)?;

            let resolve_info = call_object(
                env,
                &pm,
                "resolveActivity",
                "(Landroid/content/Intent;I)Landroid/content/pm/ResolveInfo;",
                &[JValue::Object(&j_intent), JValue::Int(0)],
            )?;
            activity_of_resolve_info(env, &resolve_info)
        })
    }

    fn application_info(
        &self,
        package_name: &str,
        flags: PackageFlags,
    ) -> Result<ApplicationInfo> {
        with_frame(|env| {
            let activity = activity()?;
            let pm = package_manager(env, &activity)?;
            let j_package = new_string(env, package_name)?;

            let info = call_object(
                env,
                &pm,
                "getApplicationInfo",
                "(Ljava/lang/String;I)Landroid/content/pm/ApplicationInfo;",
                &[JValue::Object(&j_package), JValue::Int(flags.0 as i32)],
            )
            .map_err(|e| match e {
                LauncherError::PackageNotFound(_) => {
                    LauncherError::PackageNotFound(package_name.into())
                }
                other => other,
            })?;

            let app_flags = env
                .get_field(&info, "flags", "I")
                .and_then(|v| v.i())
                .map_err(|e| java_err(env, "ApplicationInfo.flags", e))?;
            Ok(ApplicationInfo {
                package_name: package_name.into(),
                installed: app_flags & FLAG_INSTALLED != 0,
            })
        })
    }

    fn package_version(&self, package_name: &str) -> Result<Option<String>> {
        with_frame(|env| {
            let activity = activity()?;
            let pm = package_manager(env, &activity)?;
            let j_package = new_string(env, package_name)?;

            let info = call_object(
                env,
                &pm,
                "getPackageInfo",
                "(Ljava/lang/String;I)Landroid/content/pm/PackageInfo;",
                &[JValue::Object(&j_package), JValue::Int(0)],
            )?;
            string_field(env, &info, "versionName")
        })
    }

    fn load_label(&self, activity_info: &ActivityInfo) -> Result<String> {
        with_frame(|env| {
            let activity = activity()?;
            let pm = package_manager(env, &activity)?;
            let info = java_activity_info(env, &pm, activity_info)?;

            let label = call_object(
                env,
                &info,
                "loadLabel",
                "(Landroid/content/pm/PackageManager;)Ljava/lang/CharSequence;",
                &[JValue::Object(&pm)],
            )?;
            let j_label = call_object(env, &label, "toString", "()Ljava/lang/String;", &[])?;
            to_rust_string(env, j_label)
        })
    }

    fn load_banner(&self, activity_info: &ActivityInfo) -> Result<Option<Drawable>> {
        with_frame(|env| {
            let activity = activity()?;
            let pm = package_manager(env, &activity)?;
            let info = java_activity_info(env, &pm, activity_info)?;

            let drawable = call_object(
                env,
                &info,
                "loadBanner",
                "(Landroid/content/pm/PackageManager;)Landroid/graphics/drawable/Drawable;",
                &[JValue::Object(&pm)],
            )?;
            rasterize(env, &drawable)
        })
    }

    fn load_icon(&self, activity_info: &ActivityInfo) -> Result<Option<Drawable>> {
        with_frame(|env| {
            let activity = activity()?;
            let pm = package_manager(env, &activity)?;
            let info = java_activity_info(env, &pm, activity_info)?;

            let drawable = call_object(
                env,
                &info,
                "loadIcon",
                "(Landroid/content/pm/PackageManager;)Landroid/graphics/drawable/Drawable;",
                &[JValue::Object(&pm)],
            )?;
            rasterize(env, &drawable)
        })
    }

    fn start_activity(&self, intent: &Intent) -> Result<()> {
        with_frame(|env| {
            let activity = activity()?;
            let j_intent = to_java_intent(env, intent)?;

            tracing::info!(%intent, "Android: starting activity");
            call_void(
                env,
                &activity,
                "startActivity",
                "(Landroid/content/Intent;)V",
                &[JValue::Object(&j_intent)],
            )
        })
    }

    fn register_callback(&self, callback: Arc<dyn PackageCallback>) -> Result<CallbackId> {
        let handle = with_frame(|env| {
            let activity = activity()?;
            let launcher_apps = launcher_apps(env, &activity)?;
            let class = load_app_class(env, &activity, CALLBACK_CLASS)?;

            let handle = NEXT_CALLBACK.fetch_add(1, Ordering::SeqCst);
            let java_callback = env
                .new_object(&class, "(J)V", &[JValue::Long(handle as jlong)])
                .map_err(|e| java_err(env, "new NativeLauncherCallback", e))?;
            let java = env
                .new_global_ref(&java_callback)
                .map_err(|e| java_err(env, "new_global_ref(callback)", e))?;

            // Table entry first: the platform may notify as soon as it is registered.
            callbacks().insert(
                handle,
                RegisteredCallback {
                    java: java.clone(),
                    callback,
                },
            );

            if let Err(e) = call_void(
                env,
                &launcher_apps,
                "registerCallback",
                "(Landroid/content/pm/LauncherApps$Callback;)V",
                &[JValue::Object(java.as_obj())],
            ) {
                callbacks().remove(&handle);
                return Err(e);
            }
            Ok(handle)
        })?;

        tracing::info!(handle, "Android: LauncherApps callback registered");
        Ok(CallbackId(handle))
    }

    fn unregister_callback(&self, id: CallbackId) -> Result<()> {
        let Some(entry) = callbacks().remove(&id.0) else {
            return Ok(());
        };
        with_frame(|env| {
            let activity = activity()?;
            let launcher_apps = launcher_apps(env, &activity)?;

            call_void(
                env,
                &launcher_apps,
                "unregisterCallback",
                "(Landroid/content/pm/LauncherApps$Callback;)V",
                &[JValue::Object(entry.java.as_obj())],
            )
        })?;
        tracing::info!(handle = id.0, "Android: LauncherApps callback unregistered");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Native exports called by NativeLauncherCallback
// ---------------------------------------------------------------------------

fn jstring_arg(env: &mut JNIEnv<'_>, value: JString<'_>) -> Option<String> {
    match env.get_string(&value) {
        Ok(s) => Some(s.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable package name in notification");
            None
        }
    }
}

fn jstring_array_arg(env: &mut JNIEnv<'_>, values: JObjectArray<'_>) -> Vec<String> {
    let len = env.get_array_length(&values).unwrap_or(0);
    let mut out = Vec::with_capacity(len.max(0) as usize);
    for index in 0..len {
        let Ok(element) = env.get_object_array_element(&values, index) else {
            continue;
        };
        if let Some(name) = jstring_arg(env, JString::from(element)) {
            out.push(name);
        }
    }
    out
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_app_appdeck_launcher_NativeLauncherCallback_nativePackageRemoved<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    package_name: JString<'local>,
) {
    if let Some(name) = jstring_arg(&mut env, package_name) {
        dispatch(handle, |cb| cb.on_package_removed(&name));
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_app_appdeck_launcher_NativeLauncherCallback_nativePackageAdded<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    package_name: JString<'local>,
) {
    if let Some(name) = jstring_arg(&mut env, package_name) {
        dispatch(handle, |cb| cb.on_package_added(&name));
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_app_appdeck_launcher_NativeLauncherCallback_nativePackageChanged<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    package_name: JString<'local>,
) {
    if let Some(name) = jstring_arg(&mut env, package_name) {
        dispatch(handle, |cb| cb.on_package_changed(&name));
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_app_appdeck_launcher_NativeLauncherCallback_nativePackagesAvailable<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    package_names: JObjectArray<'local>,
    replacing: jboolean,
) {
    let names = jstring_array_arg(&mut env, package_names);
    dispatch(handle, |cb| cb.on_packages_available(&names, replacing != 0));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_app_appdeck_launcher_NativeLauncherCallback_nativePackagesUnavailable<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    package_names: JObjectArray<'local>,
    replacing: jboolean,
) {
    let names = jstring_array_arg(&mut env, package_names);
    dispatch(handle, |cb| cb.on_packages_unavailable(&names, replacing != 0));
}
